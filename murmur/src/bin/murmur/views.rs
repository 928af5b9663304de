//! Table and compact renderings of the library's projections.

use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};

use murmur::{ActorSummary, CommentView, NotificationKind, NotificationView, PostView, PublicProfile, ReconcileReport};

use crate::{
    output::{GlobalOptions, TableDisplay, TableRow, key_value_table},
    theme::ICONS,
};

const PREVIEW_CHARS: usize = 48;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{cut}…")
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl TableDisplay for PublicProfile {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        key_value_table(
            vec![
                ("Id", self.id.to_string()),
                ("Username", self.username.clone()),
                ("Name", self.full_name.clone()),
                ("Email", self.email.clone()),
                ("Bio", or_dash(self.bio.as_deref())),
                ("Link", or_dash(self.link.as_deref())),
                ("Avatar", or_dash(self.profile_img.as_deref())),
                ("Cover", or_dash(self.cover_img.as_deref())),
                ("Followers", self.followers.len().to_string()),
                ("Following", self.following.len().to_string()),
                ("Liked posts", self.liked_posts.len().to_string()),
                ("Joined", timestamp(&self.created_at)),
            ],
            options,
        )
    }

    fn to_compact(&self) -> String {
        TableRow::compact(self)
    }
}

impl TableRow for PublicProfile {
    const HEADERS: &'static [&'static str] = &["Username", "Name", "Followers", "Following"];
    const EMPTY: &'static str = "No one to show";

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.username),
            Cell::new(&self.full_name),
            Cell::new(self.followers.len()),
            Cell::new(self.following.len()),
        ]
    }

    fn compact(&self) -> String {
        format!("{} ({}) id={}", self.username, self.full_name, self.id)
    }
}

impl TableRow for PostView {
    const HEADERS: &'static [&'static str] = &["Id", "Author", "Text", "Image", "Likes", "Comments", "Posted"];
    const EMPTY: &'static str = "No posts";

    fn row(&self) -> Vec<Cell> {
        let author = self
            .owner
            .as_ref()
            .map(|owner| owner.username.clone())
            .unwrap_or_else(|| format!("<gone:{}>", self.owner_id));
        vec![
            Cell::new(&self.id),
            Cell::new(author),
            Cell::new(self.text.as_deref().map(preview).unwrap_or_default()),
            Cell::new(if self.image.is_some() { "yes" } else { "" }),
            Cell::new(format!("{} {}", ICONS.heart, self.likes.len())),
            Cell::new(self.comments.len()),
            Cell::new(timestamp(&self.created_at)),
        ]
    }

    fn compact(&self) -> String {
        let author = self.owner.as_ref().map(|owner| owner.username.as_str()).unwrap_or("?");
        format!(
            "{} @{author} {}{} [{} likes, {} comments]",
            self.id,
            self.text.as_deref().map(preview).unwrap_or_default(),
            if self.image.is_some() { " [image]" } else { "" },
            self.likes.len(),
            self.comments.len()
        )
    }
}

impl TableRow for CommentView<ActorSummary> {
    const HEADERS: &'static [&'static str] = &["#", "Author", "Comment", "At"];
    const EMPTY: &'static str = "No comments";

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(
                self.author
                    .as_ref()
                    .map(|author| author.username.clone())
                    .unwrap_or_else(|| format!("<gone:{}>", self.author_id)),
            ),
            Cell::new(&self.text),
            Cell::new(timestamp(&self.created_at)),
        ]
    }

    fn compact(&self) -> String {
        let author = self.author.as_ref().map(|author| author.username.as_str()).unwrap_or("?");
        format!("@{author}: {}", self.text)
    }
}

fn describe(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Follow => "followed you",
        NotificationKind::Like => "liked your post",
    }
}

impl TableRow for NotificationView {
    const HEADERS: &'static [&'static str] = &["", "From", "Event", "At"];
    const EMPTY: &'static str = "No notifications";

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::new(if self.read { "" } else { ICONS.unread }),
            Cell::new(
                self.from
                    .as_ref()
                    .map(|from| from.username.clone())
                    .unwrap_or_else(|| format!("<gone:{}>", self.from_id)),
            ),
            Cell::new(describe(self.kind)),
            Cell::new(timestamp(&self.created_at)),
        ]
    }

    fn compact(&self) -> String {
        let from = self.from.as_ref().map(|from| from.username.as_str()).unwrap_or("?");
        format!("{}{from} {}", if self.read { "" } else { "* " }, describe(self.kind))
    }
}

impl TableDisplay for ReconcileReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let join = |ids: Vec<String>| if ids.is_empty() { "-".to_string() } else { ids.join(", ") };
        key_value_table(
            vec![
                (
                    "Followers restored on",
                    join(self.followers_restored.iter().map(ToString::to_string).collect()),
                ),
                (
                    "Following restored on",
                    join(self.following_restored.iter().map(ToString::to_string).collect()),
                ),
                ("Likes restored on", join(self.likes_restored.iter().map(ToString::to_string).collect())),
            ],
            options,
        )
    }

    fn to_compact(&self) -> String {
        format!(
            "followers={} following={} likes={}",
            self.followers_restored.len(),
            self.following_restored.len(),
            self.likes_restored.len()
        )
    }
}
