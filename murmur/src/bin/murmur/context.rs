use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use murmur::{ActingUser, DirectoryMediaHost, Network, RedisStore, Settings};

pub type CliNetwork = Network<RedisStore, DirectoryMediaHost>;

/// Everything a command handler needs: the connected network and who is acting.
pub struct AppContext {
    /// Config file the settings came from (it may not exist)
    pub config_path: PathBuf,
    /// Loaded configuration
    pub settings: Settings,
    pub network: CliNetwork,
    as_user: Option<String>,
}

impl AppContext {
    /// Load settings and connect to Redis.
    pub async fn load(config: Option<&Path>, as_user: Option<String>) -> Result<Self> {
        let config_path = Settings::resolve_path(config);
        let settings = Settings::load(&config_path)?;
        let network = Network::connect(&settings)
            .await
            .with_context(|| format!("Failed to connect using {}", config_path.display()))?;
        Ok(Self {
            config_path,
            settings,
            network,
            as_user,
        })
    }

    /// The acting user named by `--as`.
    pub async fn actor(&self) -> Result<ActingUser> {
        let Some(username) = self.as_user.as_deref() else {
            bail!("This command acts on behalf of a user; pass --as <username> or set MURMUR_AS");
        };
        self.network
            .resolve_actor_by_username(username)
            .await
            .with_context(|| format!("Cannot act as '{username}'"))
    }

    /// Username given on the command line, falling back to the acting user.
    pub fn username_or_actor<'a>(&'a self, username: Option<&'a str>) -> Result<&'a str> {
        username
            .or(self.as_user.as_deref())
            .context("No username given; pass one or use --as <username>")
    }
}
