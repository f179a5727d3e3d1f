//! Whole-file JSON documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use crate::error::{StorageError, StorageResult};

/// Read and parse a JSON document. A missing file yields `None`.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::ReadFailed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::Malformed(format!("{}: {}", path.display(), e)))
}

/// Serialize `value` as pretty JSON and replace the file at `path`
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| StorageError::WriteFailed(format!("Failed to serialize {}: {}", path.display(), e)))?;
    write_atomic(path, &bytes).await
}

/// Replace `path` with `data`, creating parent directories as needed
pub async fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, data).await.map_err(|e| {
        StorageError::WriteFailed(format!("Failed to write {}: {}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).await.map_err(|e| {
        StorageError::WriteFailed(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
