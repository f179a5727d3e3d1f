//! On-disk thumbnail cache.
//!
//! Entries are PNG files named by a digest of the source path and the
//! requested size. The cache is never invalidated on source modification.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::encode::encode_png;
use crate::run_blocking;

/// Deterministic cache key for a source path and target size
pub fn cache_key(path: &Path, width: u32, height: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(b"\0");
    hasher.update(format!("{}x{}", width, height).as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.png", key))
    }

    /// Cached thumbnail, or `None` when absent or unreadable
    pub async fn get(&self, key: &str) -> Option<RgbImage> {
        let path = self.entry_path(key);
        let bytes = tokio::fs::read(&path).await.ok()?;

        let decoded = run_blocking(move || {
            image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                .map(|img| img.to_rgb8())
                .map_err(|e| stockmeta_core::AppError::Media(e.to_string()))
        })
        .await;

        match decoded {
            Ok(img) => Some(img),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring corrupt thumbnail cache entry");
                None
            }
        }
    }

    /// Store a thumbnail. Write failures are logged and otherwise ignored.
    pub async fn put(&self, key: &str, img: &RgbImage) {
        let path = self.entry_path(key);
        let img = img.clone();
        let encoded = match run_blocking(move || encode_png(&img)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to encode thumbnail for cache");
                return;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Failed to create thumbnail cache directory");
            return;
        }
        if let Err(e) = tokio::fs::write(&path, encoded).await {
            warn!(path = %path.display(), error = %e, "Failed to write thumbnail cache entry");
        }
    }
}
