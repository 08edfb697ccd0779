//! Local filesystem backend

use std::io::ErrorKind;

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use super::FileSystem;

/// The host filesystem, accessed through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &str) -> anyhow::Result<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn unlink(&self, path: &str) -> anyhow::Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to unlink cached file");
                Ok(false)
            }
        }
    }

    async fn size(&self, path: &str) -> anyhow::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }
}
