//! Per-platform keyword synthesis

use std::sync::Arc;

use stockmeta_core::constants::KEYWORDS_MAX_TOKENS;
use stockmeta_core::{AppResult, KeywordSet, MediaAsset, Platform};
use stockmeta_processing::EncodedPreview;
use tracing::{info, warn};

use crate::prompts;
use crate::services::{CompletionService, TaggingService};

const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '’', '`'];

/// Split a model reply into keyword tokens, in reply order.
///
/// Tokens are separated by commas or newlines. List markers, surrounding
/// quotes and trailing periods are stripped and empty tokens dropped.
pub fn sanitize_keywords(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|token| trim_noise(strip_list_marker(token)).to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Strip surrounding whitespace, quotes and trailing periods in any nesting
fn trim_noise(mut token: &str) -> &str {
    loop {
        let trimmed = token.trim().trim_matches(QUOTES).trim_end_matches('.');
        if trimmed.len() == token.len() {
            return trimmed;
        }
        token = trimmed;
    }
}

/// Drop a leading "- ", "* ", "• ", "1. " or "12) " marker
fn strip_list_marker(token: &str) -> &str {
    let token = token.trim_start();
    let unbulleted = token.trim_start_matches(['-', '*', '•']);
    if unbulleted.len() != token.len() {
        return unbulleted.trim_start();
    }

    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        if let Some(rest) = token[digits..].strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    token
}

/// Produces one platform's English keyword set
pub struct KeywordSynthesizer {
    completion: Arc<dyn CompletionService>,
    tagging: Option<Arc<dyn TaggingService>>,
}

impl KeywordSynthesizer {
    pub fn new(completion: Arc<dyn CompletionService>, tagging: Option<Arc<dyn TaggingService>>) -> Self {
        Self { completion, tagging }
    }

    /// One vision request for `platform`, sanitized and capped at the platform maximum.
    /// Model order is kept.
    pub async fn generate(&self, preview: &EncodedPreview, platform: Platform, hint: &str) -> AppResult<KeywordSet> {
        let prompt = prompts::keywords(platform, hint);
        let raw = self
            .completion
            .vision(preview, &prompt, KEYWORDS_MAX_TOKENS)
            .await?;
        Ok(KeywordSet::from_terms(
            sanitize_keywords(&raw),
            platform.max_keywords(),
        ))
    }

    /// Keyword set for `platform` including the Adobe fallback chain.
    ///
    /// Adobe: the tagging service is tried first when configured, the vision
    /// model otherwise or on any tagging failure. A short result is padded from
    /// one more vision request. Other platforms are a single [`generate`](Self::generate).
    pub async fn synthesize(
        &self,
        asset: &MediaAsset,
        preview: &EncodedPreview,
        platform: Platform,
        hint: &str,
    ) -> AppResult<KeywordSet> {
        if platform != Platform::Adobe {
            return self.generate(preview, platform, hint).await;
        }

        let max = platform.max_keywords();
        let base = match &self.tagging {
            Some(tagging) => match tagging.keywords(asset).await {
                Ok(terms) => KeywordSet::from_terms(terms, max),
                Err(e) => {
                    warn!(path = %asset, error = %e, "Tagging service failed, falling back to vision model");
                    self.generate(preview, platform, hint).await?
                }
            },
            None => self.generate(preview, platform, hint).await?,
        };

        if base.len() >= max {
            return Ok(base);
        }

        let candidates = self.generate(preview, platform, hint).await?;
        let padded = base.fill_to_max(max, candidates.terms());
        info!(
            platform = %platform,
            before = base.len(),
            after = padded.len(),
            "Padded keyword set"
        );
        Ok(padded)
    }
}
