use anyhow::Result;
use clap::Args;

use murmur::FollowOutcome;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Follow Edges",
    commands: &[
        "murmur --as alice follow bob     # alice follows bob (or unfollows if she already does)",
        "murmur --as alice follow bob     # run again to toggle back",
    ],
}];

#[derive(Args)]
pub struct FollowArgs {
    /// Username to follow or unfollow
    pub username: String,
}

pub async fn handle_follow(args: FollowArgs, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    let actor = ctx.actor().await?;
    let target = ctx.network.resolve_actor_by_username(&args.username).await?;
    let outcome = ctx.network.toggle_follow(&actor, &target.id).await?;

    match outcome {
        FollowOutcome::Followed => output.success(&format!("{} now follows {}", actor.username, target.username)),
        FollowOutcome::Unfollowed => output.info(&format!("{} unfollowed {}", actor.username, target.username)),
    }
    if !output.is_human() && !output.options.quiet {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}
