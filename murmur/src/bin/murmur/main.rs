mod commands;
mod context;
mod examples;
mod help;
mod output;
mod theme;
mod views;

use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use commands::{
    feed::{FeedCommands, handle_feed_commands},
    graph::{FollowArgs, handle_follow},
    notifications::{NotificationCommands, handle_notification_commands},
    posts::{PostCommands, handle_post_commands},
    users::{UserCommands, handle_user_commands},
};
use context::AppContext;
use help::Help;
use output::{GlobalOptions, OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "murmur")]
#[command(version)]
#[command(
    about = "Operate a murmur social network from the terminal",
    long_about = r#"Operator CLI for the murmur social engine:

• Sign up users, edit profiles and fetch suggestions
• Follow, post, like and comment on behalf of a user (--as)
• Read the global, following, author and liked feeds
• List and clear notifications

Commands:
  user           Accounts, profiles, suggestions and edge repair
  follow         Toggle a follow edge
  post           Create, delete, like and comment on posts
  feed           Read feeds
  notifications  List or clear the acting user's notifications
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "MURMUR_CONFIG")]
    config: Option<PathBuf>,

    /// Username of the acting user
    #[arg(long = "as", global = true, env = "MURMUR_AS", value_name = "USERNAME")]
    as_user: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse argv with the themed help. Help, version and usage errors exit here.
    fn parse_styled() -> Self {
        let matches = Help::detect()
            .decorate(Cli::command())
            .try_get_matches()
            .unwrap_or_else(|err| {
                blank_line();
                err.exit()
            });
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

fn blank_line() {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\n").and_then(|()| stdout.flush());
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, show and update users; suggestions and edge repair
    #[command(subcommand)]
    User(UserCommands),

    /// Follow a user, or unfollow if already following
    Follow(FollowArgs),

    /// Create, delete, like and comment on posts
    #[command(subcommand)]
    Post(PostCommands),

    /// Read feeds
    #[command(subcommand)]
    Feed(FeedCommands),

    /// List (and mark read) or clear notifications
    #[command(subcommand)]
    Notifications(NotificationCommands),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_styled();
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    blank_line();
    let outcome = execute(cli, &output).await;
    if let Err(err) = &outcome {
        output.error(&format!("{err:#}"));
    }
    blank_line();
    if outcome.is_err() {
        std::process::exit(1);
    }
}

async fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let ctx = AppContext::load(cli.config.as_deref(), cli.as_user).await?;
    output.verbose(&format!("using config {}", ctx.config_path.display()));

    match cli.command {
        Commands::User(user_cmd) => handle_user_commands(user_cmd, &ctx, output).await?,
        Commands::Follow(args) => handle_follow(args, &ctx, output).await?,
        Commands::Post(post_cmd) => handle_post_commands(post_cmd, &ctx, output).await?,
        Commands::Feed(feed_cmd) => handle_feed_commands(feed_cmd, &ctx, output).await?,
        Commands::Notifications(cmd) => handle_notification_commands(cmd, &ctx, output).await?,
    }

    Ok(())
}
