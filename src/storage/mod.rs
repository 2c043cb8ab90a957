pub mod local;

use bytes::Bytes;
use std::path::PathBuf;

use crate::error::ServerResult;

/// A file that was written by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Where the bytes ended up.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: usize,
}

#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Stores an upload, replacing whatever was stored before.
    async fn store(&self, data: Bytes) -> ServerResult<StoredFile>;
}
