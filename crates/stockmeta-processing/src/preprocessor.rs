use std::path::PathBuf;

use image::{Rgb, RgbImage};
use stockmeta_core::constants::{CANVAS_BACKGROUND, MODEL_INPUT_JPEG_QUALITY};
use stockmeta_core::{AppError, AppResult, MediaAsset, MediaKind};
use tracing::{debug, warn};

use crate::cache::{cache_key, ThumbnailCache};
use crate::canvas::{downsample, letterbox, placeholder};
use crate::encode::EncodedPreview;
use crate::run_blocking;
use crate::video::FrameExtractor;

/// Produces display thumbnails and model-input frames for media assets
#[derive(Debug, Clone)]
pub struct MediaPreprocessor {
    cache: ThumbnailCache,
    frames: FrameExtractor,
    background: Rgb<u8>,
    jpeg_quality: u8,
}

impl MediaPreprocessor {
    pub fn new(cache: ThumbnailCache, frames: FrameExtractor) -> Self {
        Self {
            cache,
            frames,
            background: Rgb(CANVAS_BACKGROUND),
            jpeg_quality: MODEL_INPUT_JPEG_QUALITY,
        }
    }

    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    /// Letterboxed `width` x `height` thumbnail, served from the cache when present.
    ///
    /// Videos whose first frame cannot be read yield a blank canvas. Image
    /// decode failures are returned as [`AppError::Media`].
    pub async fn thumbnail(&self, asset: &MediaAsset, width: u32, height: u32) -> AppResult<RgbImage> {
        if width == 0 || height == 0 {
            return Err(AppError::InvalidInput(format!(
                "Thumbnail size must be non-zero, got {}x{}",
                width, height
            )));
        }
        let key = cache_key(asset.path(), width, height);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(path = %asset, "Thumbnail cache hit");
            return Ok(cached);
        }

        let frame = self.source_frame(asset, width, height).await?;
        let background = self.background;
        let canvas = run_blocking(move || Ok(letterbox(&frame, width, height, background))).await?;

        self.cache.put(&key, &canvas).await;
        Ok(canvas)
    }

    /// Frame downsampled to at most `max_dim` on its longest side and encoded
    /// as JPEG. Does not touch the thumbnail cache.
    pub async fn encoded_preview(&self, asset: &MediaAsset, max_dim: u32) -> AppResult<EncodedPreview> {
        let frame = self.source_frame(asset, max_dim, max_dim).await?;
        let quality = self.jpeg_quality;
        run_blocking(move || {
            let scaled = downsample(&frame, max_dim, max_dim);
            EncodedPreview::from_image(&scaled, quality)
        })
        .await
    }

    /// Full-size source frame. `fallback_*` size the placeholder used when a
    /// video frame is unavailable.
    async fn source_frame(&self, asset: &MediaAsset, fallback_w: u32, fallback_h: u32) -> AppResult<RgbImage> {
        match asset.kind() {
            MediaKind::Video => match self.frames.first_frame(asset.path()).await {
                Ok(frame) => Ok(frame),
                Err(e) => {
                    warn!(path = %asset, error = %e, "Video frame unavailable, using placeholder");
                    Ok(placeholder(fallback_w, fallback_h, self.background))
                }
            },
            MediaKind::Image => {
                let path: PathBuf = asset.path().to_path_buf();
                run_blocking(move || {
                    image::open(&path)
                        .map(|img| img.to_rgb8())
                        .map_err(|e| AppError::Media(format!("Cannot decode {}: {}", path.display(), e)))
                })
                .await
            }
        }
    }
}
