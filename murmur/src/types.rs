//! Entity records as persisted by an [`EntityStore`](crate::store::EntityStore), and the
//! projections handed back to callers.
//!
//! Records carry every field, including the credential hash. Projections never do: the only
//! way out of this crate for a user is [`PublicProfile`] or [`ActorSummary`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{CommentId, NotificationId, PostId, UserId};

/// Persisted user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string. Never leaves the crate.
    pub password_hash: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub profile_img: Option<String>,
    #[serde(default)]
    pub cover_img: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub followers: BTreeSet<UserId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub following: BTreeSet<UserId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub liked_posts: BTreeSet<PostId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn set(&self, set: UserSet) -> Vec<String> {
        match set {
            UserSet::Followers => self.followers.iter().map(|id| id.to_string()).collect(),
            UserSet::Following => self.following.iter().map(|id| id.to_string()).collect(),
            UserSet::LikedPosts => self.liked_posts.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// The three relationship sets stored on a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSet {
    Followers,
    Following,
    LikedPosts,
}

impl UserSet {
    pub const ALL: [UserSet; 3] = [UserSet::Followers, UserSet::Following, UserSet::LikedPosts];

    /// Relation alias used in store keys.
    pub fn alias(self) -> &'static str {
        match self {
            UserSet::Followers => "followers",
            UserSet::Following => "following",
            UserSet::LikedPosts => "liked_posts",
        }
    }
}

/// Persisted post document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub owner: UserId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub likes: BTreeSet<UserId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a post's append-only comment sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Follow => "follow",
            NotificationKind::Like => "like",
        }
    }
}

/// Persisted notification document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub from: UserId,
    pub to: UserId,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Selection for [`EntityStore::list_posts`](crate::store::EntityStore::list_posts).
#[derive(Debug, Clone, PartialEq)]
pub enum PostQuery {
    /// Every post, newest first.
    All,
    /// Posts owned by any of the given users, newest first.
    ByOwners(Vec<UserId>),
    /// Posts with the given ids, in store-defined order. Unknown ids are skipped.
    ByIds(Vec<PostId>),
}

/// The caller identity yielded by the identity resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ActingUser {
    pub id: UserId,
    pub username: String,
    pub following: BTreeSet<UserId>,
}

impl From<&UserRecord> for ActingUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            following: user.following.clone(),
        }
    }
}

/// Full user profile minus the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PublicProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
    pub followers: Vec<UserId>,
    pub following: Vec<UserId>,
    pub liked_posts: Vec<PostId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for PublicProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            link: user.link.clone(),
            profile_img: user.profile_img.clone(),
            cover_img: user.cover_img.clone(),
            followers: user.followers.iter().cloned().collect(),
            following: user.following.iter().cloned().collect(),
            liked_posts: user.liked_posts.iter().cloned().collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Compact author projection: username, display name and avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ActorSummary {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub profile_img: Option<String>,
}

impl From<&UserRecord> for ActorSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_img: user.profile_img.clone(),
        }
    }
}

/// A comment with its author projected. `author` is `None` when the account is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CommentView<A> {
    pub id: CommentId,
    pub author_id: UserId,
    pub author: Option<A>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post as rendered in a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PostView {
    pub id: PostId,
    pub owner_id: UserId,
    pub owner: Option<PublicProfile>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub likes: Vec<UserId>,
    pub comments: Vec<CommentView<PublicProfile>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NotificationView {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub from_id: UserId,
    pub from: Option<ActorSummary>,
    pub to: UserId,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

/// Signup request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signup {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Post creation request. At least one of `text` and `image` must be present.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub text: Option<String>,
    pub image: Option<Vec<u8>>,
}

/// Partial profile update. Absent or blank values leave the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<Vec<u8>>,
    pub cover_img: Option<Vec<u8>>,
}

/// Repairs performed by [`Network::reconcile_edges`](crate::Network::reconcile_edges).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Users whose `followers` set regained the reconciled user.
    pub followers_restored: Vec<UserId>,
    /// Users whose `following` set regained the reconciled user.
    pub following_restored: Vec<UserId>,
    /// Posts whose like set regained the reconciled user.
    pub likes_restored: Vec<PostId>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.followers_restored.is_empty() && self.following_restored.is_empty() && self.likes_restored.is_empty()
    }
}
