pub mod feed;
pub mod graph;
pub mod notifications;
pub mod posts;
pub mod users;

use std::path::Path;

use anyhow::{Context, Result};

/// Read an image given on the command line.
pub async fn read_image(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    match path {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            Ok(Some(bytes))
        }
        None => Ok(None),
    }
}
