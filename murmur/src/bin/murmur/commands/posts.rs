use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use murmur::{NewPost, PostId};

use crate::commands::read_image;
use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Publishing",
        commands: &[
            "murmur --as alice post create --text \"down the rabbit hole\"",
            "murmur --as alice post create --image ./hole.jpg",
            "murmur --as alice post delete Qm3xTn8vKpWz2rYbHcJd",
        ],
    },
    ExampleGroup {
        title: "Engagement",
        commands: &[
            "murmur --as bob post like Qm3xTn8vKpWz2rYbHcJd          # like, or unlike if already liked",
            "murmur --as bob post comment Qm3xTn8vKpWz2rYbHcJd \"wait for me\"",
        ],
    },
];

#[derive(Subcommand)]
pub enum PostCommands {
    /// Publish a post with text, an image, or both
    #[command(name = "create")]
    Create {
        #[arg(long)]
        text: Option<String>,

        /// Image file to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete one of the acting user's posts
    #[command(name = "delete")]
    Delete { id: String },

    /// Like a post, or unlike it if already liked
    #[command(name = "like")]
    Like { id: String },

    /// Comment on a post
    #[command(name = "comment")]
    Comment { id: String, text: String },
}

pub async fn handle_post_commands(command: PostCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    let actor = ctx.actor().await?;

    match command {
        PostCommands::Create { text, image } => {
            let new_post = NewPost {
                text,
                image: read_image(image.as_deref()).await?,
            };
            let post = ctx.network.create_post(&actor, new_post).await?;
            output.success(&format!("Posted {}", post.id));
            output.display(&vec![post])?;
        }
        PostCommands::Delete { id } => {
            ctx.network.delete_post(&actor, &PostId::from(id.as_str())).await?;
            output.success(&format!("Deleted post {id}"));
        }
        PostCommands::Like { id } => {
            let likes = ctx.network.toggle_like(&actor, &PostId::from(id.as_str())).await?;
            if likes.contains(&actor.id) {
                output.success(&format!("{} Liked {id} ({} likes)", ICONS.heart, likes.len()));
            } else {
                output.info(&format!("Unliked {id} ({} likes)", likes.len()));
            }
            if !output.is_human() && !output.options.quiet {
                println!("{}", serde_json::to_string(&likes)?);
            }
        }
        PostCommands::Comment { id, text } => {
            let comments = ctx
                .network
                .append_comment(&actor, &PostId::from(id.as_str()), &text)
                .await?;
            output.success(&format!("Commented on {id}"));
            output.display(&comments)?;
        }
    }
    Ok(())
}
