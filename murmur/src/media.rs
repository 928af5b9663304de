//! Media collaborator: stores uploaded image bytes and hands back a URL reference.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;

use crate::{errors::MediaError, id::generate_entity_id};

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store `bytes` and return the URL the asset is served from.
    async fn upload(&self, bytes: &[u8]) -> Result<String, MediaError>;

    /// Release the asset behind `url`.
    async fn destroy(&self, url: &str) -> Result<(), MediaError>;
}

/// Public id of a media reference: the last path segment without its extension.
///
/// `https://cdn.example/img/upload/v1/abc123.png` yields `abc123`.
pub fn public_id(url: &str) -> &str {
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    }
}

/// Best-effort file extension from the leading magic bytes.
fn sniff_extension(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "png",
        [0xFF, 0xD8, 0xFF, ..] => "jpg",
        [b'G', b'I', b'F', b'8', ..] => "gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "webp",
        _ => "bin",
    }
}

/// Writes assets into a local directory and serves them under `base_url`.
#[derive(Debug, Clone)]
pub struct DirectoryMediaHost {
    root: PathBuf,
    base_url: String,
}

impl DirectoryMediaHost {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaHost for DirectoryMediaHost {
    async fn upload(&self, bytes: &[u8]) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Rejected {
                message: "empty upload".to_string(),
            });
        }
        tokio::fs::create_dir_all(&self.root).await?;
        let file_name = format!("{}.{}", generate_entity_id(), sniff_extension(bytes));
        tokio::fs::write(self.root.join(&file_name), bytes).await?;
        debug!("stored media {file_name} ({} bytes)", bytes.len());
        Ok(format!("{}/{}", self.base_url, file_name))
    }

    async fn destroy(&self, url: &str) -> Result<(), MediaError> {
        let id = public_id(url);
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("media root {} missing while destroying {id}", self.root.display());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let mut removed = false;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_stem().and_then(|stem| stem.to_str()) == Some(id) {
                tokio::fs::remove_file(&path).await?;
                removed = true;
            }
        }
        if removed {
            debug!("destroyed media {id}");
        } else {
            warn!("media {id} already gone");
        }
        Ok(())
    }
}

/// Keeps assets in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryMediaHost {
    assets: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaHost {
    pub const BASE_URL: &'static str = "memory://media";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.assets.lock().contains_key(public_id(url))
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.lock().is_empty()
    }
}

#[async_trait]
impl MediaHost for MemoryMediaHost {
    async fn upload(&self, bytes: &[u8]) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Rejected {
                message: "empty upload".to_string(),
            });
        }
        let id = generate_entity_id();
        let url = format!("{}/{}.{}", Self::BASE_URL, id, sniff_extension(bytes));
        self.assets.lock().insert(id, bytes.to_vec());
        Ok(url)
    }

    async fn destroy(&self, url: &str) -> Result<(), MediaError> {
        if self.assets.lock().remove(public_id(url)).is_none() {
            warn!("media {} already gone", public_id(url));
        }
        Ok(())
    }
}
