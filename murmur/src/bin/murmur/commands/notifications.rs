use anyhow::Result;
use clap::Subcommand;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inbox",
    commands: &[
        "murmur --as bob notifications list     # newest first; marks them read",
        "murmur --as bob notifications clear    # delete all of bob's notifications",
    ],
}];

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications newest first and mark them read
    #[command(name = "list")]
    List,

    /// Delete every notification
    #[command(name = "clear")]
    Clear,
}

pub async fn handle_notification_commands(
    command: NotificationCommands,
    ctx: &AppContext,
    output: &OutputManager,
) -> Result<()> {
    let actor = ctx.actor().await?;

    match command {
        NotificationCommands::List => {
            let unread = ctx.network.unread_count(&actor.id).await?;
            output.heading(&format!("Notifications for {} ({unread} unread)", actor.username));
            let notifications = ctx.network.list_and_mark_read(&actor.id).await?;
            output.display(&notifications)?;
        }
        NotificationCommands::Clear => {
            let removed = ctx.network.clear(&actor.id).await?;
            output.success(&format!("Cleared {removed} notifications"));
        }
    }
    Ok(())
}
