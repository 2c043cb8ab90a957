use anyhow::Result;
use bytes::Bytes;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::fs::{self, File};

use crate::error::{ServerError, ServerResult};
use super::{StorageBackend, StoredFile};

/// Distinguishes temporary files of concurrent writes.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct LocalBackend {
    config: LocalStorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalStorageConfig {
    /// The file every upload is written to.
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Write to a temporary file and rename it over `path`.
    ///
    /// Readers then never see a partially written file. Off by default,
    /// which truncates and rewrites `path` in place.
    #[serde(default = "default_atomic")]
    pub atomic: bool,
}
impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            atomic: default_atomic(),
        }
    }
}

impl LocalBackend {
    pub async fn new(config: LocalStorageConfig) -> Result<Self> {
        if let Some(parent) = non_empty_parent(&config.path) {
            fs::create_dir_all(parent).await?;
        }

        Ok(Self { config })
    }

    /// Returns a fresh sibling path of `target`.
    fn get_temp_path(target: &Path) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(target.file_name().unwrap_or_default());
        name.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        ));

        target.with_file_name(name)
    }

    /// Returns the file a rename has to replace.
    ///
    /// Symlinks are followed so the link itself survives the write.
    async fn get_rename_target(&self) -> std::io::Result<PathBuf> {
        match fs::canonicalize(&self.config.path).await {
            Ok(resolved) => Ok(resolved),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(self.config.path.clone()),
            Err(e) => Err(e),
        }
    }

    async fn write(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn write_atomic(&self, data: &[u8]) -> ServerResult<()> {
        let target = self
            .get_rename_target()
            .await
            .map_err(ServerError::storage_error)?;
        let temp_path = Self::get_temp_path(&target);

        let result = match Self::write(&temp_path, data).await {
            Ok(()) => fs::rename(&temp_path, &target).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                tracing::debug!("Could not remove {}: {}", temp_path.display(), cleanup);
            }
            return Err(ServerError::storage_error(e));
        }

        Ok(())
    }
}
#[async_trait::async_trait]
impl StorageBackend for LocalBackend {
    async fn store(&self, data: Bytes) -> ServerResult<StoredFile> {
        if self.config.atomic {
            self.write_atomic(&data).await?;
        } else {
            Self::write(&self.config.path, &data)
                .await
                .map_err(ServerError::storage_error)?;
        }

        Ok(StoredFile {
            path: self.config.path.clone(),
            size: data.len(),
        })
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn default_path() -> PathBuf {
    "received.jpg".into()
}
fn default_atomic() -> bool {
    false
}
