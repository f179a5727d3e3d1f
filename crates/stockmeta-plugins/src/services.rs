//! Seams between the pipeline and its remote collaborators

use async_trait::async_trait;
use stockmeta_core::{AppResult, MediaAsset};
use stockmeta_processing::EncodedPreview;

/// Chat-completion style language model
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Single-turn request carrying one image and an instruction.
    /// Returns the first choice's message content, trimmed.
    async fn vision(&self, preview: &EncodedPreview, prompt: &str, max_tokens: u32) -> AppResult<String>;

    /// Single-turn text-only request
    async fn text(&self, prompt: &str, max_tokens: u32) -> AppResult<String>;
}

/// Third-party keyword tagging of raw asset bytes
#[async_trait]
pub trait TaggingService: Send + Sync {
    /// Keywords in service order
    async fn keywords(&self, asset: &MediaAsset) -> AppResult<Vec<String>>;
}
