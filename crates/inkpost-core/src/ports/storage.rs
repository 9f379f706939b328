//! Upload storage port.

use async_trait::async_trait;

/// Stores uploaded files and hands back where they ended up.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `bytes` under a fresh name that keeps the extension of
    /// `original_name`. Returns the final storage path.
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError>;
}

/// Upload storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
