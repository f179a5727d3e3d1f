//! Best-effort translation.
//!
//! Nothing here is on the failure-critical path: every failure degrades to
//! the untranslated source.

use std::sync::Arc;

use stockmeta_core::constants::{TRANSLATION_BATCH_LIMIT, TRANSLATION_MAX_TOKENS};
use stockmeta_core::{AppResult, Language};
use tracing::warn;

use crate::prompts;
use crate::services::CompletionService;

const LIST_DELIMITER: &str = ", ";

pub struct TranslationService {
    completion: Arc<dyn CompletionService>,
}

impl TranslationService {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// One free-text translation request
    pub async fn translate(&self, text: &str, target: Language) -> AppResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        self.completion
            .text(&prompts::translation(text, target), TRANSLATION_MAX_TOKENS)
            .await
    }

    /// [`translate`](Self::translate), returning `text` unchanged on failure
    pub async fn translate_or_source(&self, text: &str, target: Language) -> String {
        match self.translate(text, target).await {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!(target_language = %target, error = %e, "Translation failed, keeping source text");
                text.to_string()
            }
        }
    }

    /// Translate a word list in one request.
    ///
    /// The output always has exactly `words.len()` entries: any position the
    /// reply leaves missing or empty keeps its source word. Only the first
    /// batch of words is sent; the rest are returned as-is.
    pub async fn translate_list<S: AsRef<str>>(&self, words: &[S], target: Language) -> Vec<String> {
        let source: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();
        if source.is_empty() {
            return Vec::new();
        }

        let batch = &source[..source.len().min(TRANSLATION_BATCH_LIMIT)];
        let reply = match self.translate(&batch.join(LIST_DELIMITER), target).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    target_language = %target,
                    count = source.len(),
                    error = %e,
                    "Keyword translation failed, keeping source terms"
                );
                return source.iter().map(|w| w.to_string()).collect();
            }
        };

        let parts: Vec<&str> = reply.split(',').map(str::trim).collect();
        source
            .iter()
            .enumerate()
            .map(|(i, word)| match parts.get(i) {
                Some(part) if i < batch.len() && !part.is_empty() => part.to_string(),
                _ => word.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedCompletion;
    use stockmeta_core::AppError;

    fn service(replies: Vec<AppResult<String>>) -> (Arc<ScriptedCompletion>, TranslationService) {
        let completion = Arc::new(ScriptedCompletion::with_text(replies));
        (completion.clone(), TranslationService::new(completion))
    }

    #[tokio::test]
    async fn test_list_survives_unreachable_service() {
        let (_, service) = service(vec![Err(AppError::Network("connection refused".into()))]);
        let out = service.translate_list(&["alpha", "beta"], Language::Tr).await;
        assert_eq!(out, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_short_reply_keeps_source_positions() {
        let (_, service) = service(vec![Ok("kedi, , kuş".to_string())]);
        let out = service
            .translate_list(&["cat", "dog", "bird", "fish"], Language::Tr)
            .await;
        assert_eq!(out, vec!["kedi", "dog", "kuş", "fish"]);
    }

    #[tokio::test]
    async fn test_long_reply_is_truncated() {
        let (_, service) = service(vec![Ok("bir, iki, üç, dört".to_string())]);
        let out = service.translate_list(&["one", "two"], Language::Tr).await;
        assert_eq!(out, vec!["bir", "iki"]);
    }

    #[tokio::test]
    async fn test_only_first_batch_is_sent() {
        let words: Vec<String> = (0..60).map(|i| format!("w{}", i)).collect();
        let reply: Vec<String> = (0..60).map(|i| format!("t{}", i)).collect();
        let (completion, service) = service(vec![Ok(reply.join(", "))]);

        let out = service.translate_list(&words, Language::Tr).await;

        assert_eq!(out.len(), 60);
        assert_eq!(out[49], "t49");
        assert_eq!(out[50], "w50");
        let prompt = completion.last_prompt().unwrap();
        assert!(prompt.contains("w49"));
        assert!(!prompt.contains("w50"));
    }

    #[tokio::test]
    async fn test_empty_list_makes_no_request() {
        let (completion, service) = service(vec![]);
        let empty: Vec<String> = Vec::new();
        assert!(service.translate_list(&empty, Language::Tr).await.is_empty());
        assert_eq!(completion.text_calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_or_source_falls_back() {
        let (_, service) = service(vec![
            Ok("Red fox".to_string()),
            Err(AppError::Timeout("text".into())),
        ]);
        assert_eq!(
            service.translate_or_source("Kızıl tilki", Language::En).await,
            "Red fox"
        );
        assert_eq!(
            service.translate_or_source("Kızıl tilki", Language::En).await,
            "Kızıl tilki"
        );
    }
}
