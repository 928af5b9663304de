use anyhow::Result;
use clap::Subcommand;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Timelines",
        commands: &[
            "murmur feed global                    # every post, newest first",
            "murmur --as alice feed following      # posts by people alice follows",
            "murmur feed author bob                # bob's posts",
        ],
    },
    ExampleGroup {
        title: "Likes",
        commands: &[
            "murmur feed liked bob                 # posts bob liked",
            "murmur --as alice feed liked --output json",
        ],
    },
];

#[derive(Subcommand)]
pub enum FeedCommands {
    /// All posts, newest first
    #[command(name = "global")]
    Global,

    /// Posts by users the acting user follows
    #[command(name = "following")]
    Following,

    /// Posts by one user
    #[command(name = "author")]
    Author { username: String },

    /// Posts a user liked (defaults to the acting user)
    #[command(name = "liked")]
    Liked { username: Option<String> },
}

pub async fn handle_feed_commands(command: FeedCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    let (title, posts) = match command {
        FeedCommands::Global => ("Global feed".to_string(), ctx.network.global_feed().await?),
        FeedCommands::Following => {
            let actor = ctx.actor().await?;
            (
                format!("Following feed of {}", actor.username),
                ctx.network.following_feed(&actor.id).await?,
            )
        }
        FeedCommands::Author { username } => {
            let posts = ctx.network.author_feed(&username).await?;
            (format!("Posts by {username}"), posts)
        }
        FeedCommands::Liked { username } => {
            let username = ctx.username_or_actor(username.as_deref())?;
            let user = ctx.network.resolve_actor_by_username(username).await?;
            (format!("Liked by {username}"), ctx.network.liked_feed(&user.id).await?)
        }
    };

    output.heading(&title);
    output.display(&posts)?;
    Ok(())
}
