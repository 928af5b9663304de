use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use murmur::{ProfileUpdate, Signup};

use crate::commands::read_image;
use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Accounts",
        commands: &[
            "murmur user signup alice --name \"Alice Liddell\" --email alice@example.com --password s3cret!",
            "murmur user show alice",
            "murmur --as alice user update --bio \"Curiouser and curiouser\" --avatar ./me.png",
        ],
    },
    ExampleGroup {
        title: "Suggestions",
        commands: &[
            "murmur --as alice user suggest              # configured count (default 4)",
            "murmur --as alice user suggest --count 10",
        ],
    },
    ExampleGroup {
        title: "Repair",
        commands: &["murmur user reconcile bob                  # restore half-written follow and like edges"],
    },
];

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    #[command(name = "signup")]
    Signup {
        username: String,

        /// Display name
        #[arg(long = "name")]
        full_name: String,

        #[arg(long)]
        email: String,

        /// At least 6 characters
        #[arg(long, env = "MURMUR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show a profile (defaults to the acting user)
    #[command(name = "show")]
    Show { username: Option<String> },

    /// Edit the acting user's profile; omitted fields stay unchanged
    #[command(name = "update")]
    Update {
        #[arg(long = "name")]
        full_name: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        link: Option<String>,

        /// Profile image file
        #[arg(long)]
        avatar: Option<PathBuf>,

        /// Cover image file
        #[arg(long)]
        cover: Option<PathBuf>,
    },

    /// Suggest users for the acting user to follow
    #[command(name = "suggest")]
    Suggest {
        #[arg(long)]
        count: Option<usize>,
    },

    /// Restore missing halves of a user's follow and like edges
    #[command(name = "reconcile")]
    Reconcile { username: String },
}

pub async fn handle_user_commands(command: UserCommands, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    match command {
        UserCommands::Signup {
            username,
            full_name,
            email,
            password,
        } => {
            let profile = ctx
                .network
                .signup(Signup {
                    username,
                    full_name,
                    email,
                    password,
                })
                .await?;
            output.success(&format!("Signed up {} ({})", profile.username, profile.id));
            output.display(&profile)?;
        }
        UserCommands::Show { username } => {
            let username = ctx.username_or_actor(username.as_deref())?;
            let profile = ctx.network.profile(username).await?;
            output.display(&profile)?;
        }
        UserCommands::Update {
            full_name,
            username,
            email,
            bio,
            link,
            avatar,
            cover,
        } => {
            let actor = ctx.actor().await?;
            let update = ProfileUpdate {
                full_name,
                username,
                email,
                bio,
                link,
                profile_img: read_image(avatar.as_deref()).await?,
                cover_img: read_image(cover.as_deref()).await?,
            };
            let profile = ctx.network.update_profile(&actor, update).await?;
            output.success(&format!("Updated {}", profile.username));
            output.display(&profile)?;
        }
        UserCommands::Suggest { count } => {
            let actor = ctx.actor().await?;
            let count = count.unwrap_or(ctx.settings.suggestions.count);
            let suggestions = ctx.network.suggest(&actor.id, count).await?;
            if suggestions.is_empty() {
                output.info("No suggestions: already following everyone");
            } else {
                output.heading(&format!("Suggested for {}", actor.username));
            }
            output.display(&suggestions)?;
        }
        UserCommands::Reconcile { username } => {
            let user = ctx
                .network
                .resolve_actor_by_username(&username)
                .await
                .with_context(|| format!("Cannot reconcile '{username}'"))?;
            let report = ctx.network.reconcile_edges(&user.id).await?;
            if report.is_clean() {
                output.success(&format!("Edges of {username} are already symmetric"));
            } else {
                output.warning(&format!("Repaired edges of {username}"));
            }
            output.display(&report)?;
        }
    }
    Ok(())
}
