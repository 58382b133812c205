use super::BlobStore;
use crate::domain::error::{AppError, Result};
use crate::domain::proof::BlobReceipt;
use crate::shared::hashing::sha256_hex;
use async_trait::async_trait;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

fn storage_err(msg: impl Into<String>) -> AppError {
    AppError::StorageError(msg.into())
}

/// Bundles stored as `{dir}/{sha256}.json`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, blob_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", blob_id))
    }

    pub fn read(&self, blob_id: &str) -> Result<Vec<u8>> {
        let path = self.path_for(blob_id);
        fs::read(&path).map_err(|e| storage_err(format!("Failed to read {}: {e}", path.display())))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            storage_err(format!("Failed to create dir {}: {e}", self.root.display()))
        })?;

        let tmp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        {
            let mut file = fs::File::create(&tmp_path).map_err(|e| {
                storage_err(format!("Failed to create temp file {}: {e}", tmp_path.display()))
            })?;
            file.write_all(bytes).map_err(|e| {
                storage_err(format!("Failed to write temp file {}: {e}", tmp_path.display()))
            })?;
            file.sync_all().ok();
        }

        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            storage_err(format!(
                "Failed to rename temp file {} to {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }

    fn file_url(path: &Path) -> String {
        fs::canonicalize(path)
            .ok()
            .and_then(|abs| url::Url::from_file_path(abs).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| path.display().to_string())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<BlobReceipt> {
        let blob_id = sha256_hex(&bytes);
        let path = self.path_for(&blob_id);

        // same id means same bytes
        let already_stored = path.exists();
        if !already_stored {
            self.write_atomic(&path, &bytes)?;
        }
        debug!(blob_id = %blob_id, already_stored, "Stored bundle locally");

        Ok(BlobReceipt {
            blob_url: Self::file_url(&path),
            raw_response: json!({
                "path": path.display().to_string(),
                "size": bytes.len(),
                "alreadyStored": already_stored,
            }),
            blob_id,
            object_id: None,
            object_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"));

        let first = store.put(b"{\"a\": 1}".to_vec()).await.unwrap();
        assert_eq!(first.blob_id, sha256_hex(b"{\"a\": 1}"));
        assert!(first.blob_url.starts_with("file://"));
        assert_eq!(store.read(&first.blob_id).unwrap(), b"{\"a\": 1}");
        assert_eq!(first.raw_response["alreadyStored"], false);

        let again = store.put(b"{\"a\": 1}".to_vec()).await.unwrap();
        assert_eq!(again.blob_id, first.blob_id);
        assert_eq!(again.raw_response["alreadyStored"], true);

        let other = store.put(b"{\"a\": 2}".to_vec()).await.unwrap();
        assert_ne!(other.blob_id, first.blob_id);
    }

    #[test]
    fn test_read_missing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert!(matches!(store.read("nope"), Err(AppError::StorageError(_))));
    }
}
