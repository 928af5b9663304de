//! Runtime settings loaded from `murmur.toml`.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "murmur.toml";
pub const CONFIG_ENV: &str = "MURMUR_CONFIG";
pub const DEFAULT_SUGGESTION_COUNT: usize = 4;

static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env reference pattern is valid"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {0} not set")]
    MissingVar(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub redis: RedisSettings,
    #[serde(default)]
    pub media: MediaSettings,
    #[serde(default)]
    pub suggestions: SuggestionSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            prefix: default_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_prefix() -> String {
    "murmur".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSettings {
    #[serde(default = "default_media_root")]
    pub root: String,
    #[serde(default = "default_media_base_url")]
    pub base_url: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            base_url: default_media_base_url(),
        }
    }
}

fn default_media_root() -> String {
    ".murmur/media".to_string()
}

fn default_media_base_url() -> String {
    "file://.murmur/media".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSettings {
    #[serde(default = "default_suggestion_count")]
    pub count: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            count: default_suggestion_count(),
        }
    }
}

fn default_suggestion_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Config path from an explicit flag, then `MURMUR_CONFIG`, then `murmur.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn redis_url(&self) -> Result<String, ConfigError> {
        expand_env(&self.redis.url).map(Cow::into_owned)
    }

    pub fn media_root(&self) -> Result<PathBuf, ConfigError> {
        expand_env(&self.media.root).map(|root| PathBuf::from(root.as_ref()))
    }

    pub fn media_base_url(&self) -> Result<String, ConfigError> {
        expand_env(&self.media.base_url).map(Cow::into_owned)
    }
}

/// Replace every `${VAR}` in `value` with the variable's value.
pub fn expand_env(value: &str) -> Result<Cow<'_, str>, ConfigError> {
    if let Some(missing) = ENV_REFERENCE
        .captures_iter(value)
        .map(|caps| caps[1].to_string())
        .find(|name| std::env::var(name).is_err())
    {
        return Err(ConfigError::MissingVar(missing));
    }
    Ok(ENV_REFERENCE.replace_all(value, |caps: &Captures| std::env::var(&caps[1]).unwrap_or_default()))
}
