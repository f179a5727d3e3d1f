//! Stockmeta Media Processing Library
//!
//! Turns image and video assets into letterboxed thumbnails (cached on disk,
//! keyed by path and size) and into the downsampled JPEG frames sent to the
//! vision model.

pub mod cache;
pub mod canvas;
pub mod encode;
pub mod preprocessor;
pub mod video;

pub use cache::{cache_key, ThumbnailCache};
pub use canvas::{downsample, fit_within, letterbox, placeholder};
pub use encode::EncodedPreview;
pub use preprocessor::MediaPreprocessor;
pub use video::FrameExtractor;

use stockmeta_core::{AppError, AppResult};

/// Run CPU-bound decode/encode work off the async executor
pub(crate) async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}
