//! Throttled background population of folder thumbnails.
//!
//! Each `start` begins a new generation. A sequence stops as soon as a newer
//! one has started, and every event is tagged with its generation so the
//! receiver can drop stale ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
use stockmeta_core::constants::{THUMBNAIL_THROTTLE_MS, THUMB_HEIGHT, THUMB_WIDTH};
use stockmeta_core::MediaAsset;
use stockmeta_processing::MediaPreprocessor;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum ThumbnailEvent {
    /// `image` is `None` when the thumbnail could not be produced
    Ready {
        generation: u64,
        path: String,
        image: Option<RgbImage>,
    },
    Finished { generation: u64 },
}

impl ThumbnailEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ThumbnailEvent::Ready { generation, .. } | ThumbnailEvent::Finished { generation } => {
                *generation
            }
        }
    }
}

pub struct ThumbnailLoader {
    preprocessor: Arc<MediaPreprocessor>,
    current: Arc<AtomicU64>,
    throttle: Duration,
    size: (u32, u32),
}

impl ThumbnailLoader {
    pub fn new(preprocessor: Arc<MediaPreprocessor>) -> Self {
        Self {
            preprocessor,
            current: Arc::new(AtomicU64::new(0)),
            throttle: Duration::from_millis(THUMBNAIL_THROTTLE_MS),
            size: (THUMB_WIDTH, THUMB_HEIGHT),
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn preprocessor(&self) -> &Arc<MediaPreprocessor> {
        &self.preprocessor
    }

    pub fn current_generation(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Start loading thumbnails for `assets`, superseding any running sequence.
    /// Returns the new generation.
    pub fn start(&self, assets: Vec<MediaAsset>, events: UnboundedSender<ThumbnailEvent>) -> u64 {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.current);
        let preprocessor = Arc::clone(&self.preprocessor);
        let throttle = self.throttle;
        let (width, height) = self.size;

        tokio::spawn(async move {
            for (i, asset) in assets.into_iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(throttle).await;
                }
                if current.load(Ordering::SeqCst) != generation {
                    debug!(generation, "Thumbnail sequence superseded");
                    return;
                }

                let image = match preprocessor.thumbnail(&asset, width, height).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        warn!(path = %asset, error = %e, "Thumbnail unavailable");
                        None
                    }
                };
                let event = ThumbnailEvent::Ready {
                    generation,
                    path: asset.key(),
                    image,
                };
                if events.send(event).is_err() {
                    return;
                }
            }
            let _ = events.send(ThumbnailEvent::Finished { generation });
        });

        generation
    }
}
