use crate::domain::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Scratch directory for uploads and bundles that live only for one request
#[derive(Debug, Clone)]
pub struct TempStorage {
    root: PathBuf,
}

impl TempStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` as `{timestamp}_{request_id}_{name}` with spaces in the
    /// name replaced by `_`. The request id keeps same-second uploads of the
    /// same name apart.
    pub fn save(
        &self,
        name: &str,
        bytes: &[u8],
        timestamp: i64,
        request_id: Uuid,
    ) -> Result<PathBuf> {
        self.write(
            &format!("{}_{}_{}", timestamp, request_id.simple(), sanitize_filename(name)),
            bytes,
        )
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        ensure_dir(&self.root)?;
        let path = self.root.join(sanitize_filename(name));
        fs::write(&path, bytes).map_err(|e| {
            AppError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }
}

/// Final path component with spaces replaced; never empty
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .replace(' ', "_");
    if base.is_empty() {
        "upload".to_string()
    } else {
        base
    }
}

/// Best-effort delete; failures are only logged
pub fn remove_file_safe(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            AppError::IoError(format!("Failed to create dir {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}
