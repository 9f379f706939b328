//! Local-disk upload store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use inkpost_core::ports::{StorageError, UploadStore};

/// Writes uploads into a single directory under random names.
///
/// Each upload is first written to `<dir>/<32 hex chars>` and then renamed to
/// carry the extension of the client's file name, so concurrent uploads never
/// share a path.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    dir: PathBuf,
}

impl LocalUploadStore {
    /// Use `dir` for uploads, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Extension taken from a client-supplied file name.
///
/// Everything after the last `.` of the final path component (the whole
/// component when there is no dot), restricted to ASCII alphanumerics.
fn extension_of(original_name: &str) -> String {
    let file_name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let ext = file_name.rsplit('.').next().unwrap_or(file_name);
    ext.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError> {
        let temp_path = self.dir.join(Uuid::new_v4().simple().to_string());
        tokio::fs::write(&temp_path, bytes).await?;

        let ext = extension_of(original_name);
        let final_path = if ext.is_empty() {
            temp_path
        } else {
            let mut name = temp_path.clone().into_os_string();
            name.push(".");
            name.push(&ext);
            let final_path = PathBuf::from(name);
            tokio::fs::rename(&temp_path, &final_path).await?;
            final_path
        };

        tracing::debug!(path = %final_path.display(), size = bytes.len(), "Upload stored");
        Ok(final_path.to_string_lossy().into_owned())
    }
}
