use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::error::{AppError, AppResult};

/// Media kind, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// An image or video file identified by its absolute path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaAsset {
    path: PathBuf,
    kind: MediaKind,
}

impl MediaAsset {
    /// Resolve `path` to an absolute path and classify it.
    /// Unsupported extensions are rejected.
    pub fn new(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = std::path::absolute(path.as_ref()).map_err(|e| {
            AppError::InvalidInput(format!(
                "Cannot resolve path {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let kind = MediaKind::from_path(&path).ok_or_else(|| {
            AppError::InvalidInput(format!("Unsupported media type: {}", path.display()))
        })?;
        Ok(Self { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record key: the absolute path as text
    pub fn key(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Folder whose record table owns this asset
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }
}

impl fmt::Display for MediaAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
