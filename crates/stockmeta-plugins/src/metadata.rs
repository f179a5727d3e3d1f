use std::sync::Arc;

use stockmeta_core::constants::METADATA_MAX_TOKENS;
use stockmeta_core::{AppError, AppResult, TitleDescription};
use stockmeta_processing::EncodedPreview;

use crate::prompts;
use crate::services::CompletionService;

/// The span from the first `{` to the last `}`, if any
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Generates bilingual title and description for an asset
pub struct MetadataGenerator {
    completion: Arc<dyn CompletionService>,
}

impl MetadataGenerator {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn describe(&self, preview: &EncodedPreview, hint: &str) -> AppResult<TitleDescription> {
        let raw = self
            .completion
            .vision(preview, &prompts::metadata(hint), METADATA_MAX_TOKENS)
            .await?;

        let object = extract_json_object(&raw).ok_or_else(|| {
            AppError::Parse(format!(
                "No JSON object in metadata response: {}",
                raw.chars().take(200).collect::<String>()
            ))
        })?;
        serde_json::from_str(object)
            .map_err(|e| AppError::Parse(format!("Malformed metadata object: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{preview, ScriptedCompletion};

    #[test]
    fn test_extract_json_object() {
        assert_eq!(
            extract_json_object("Sure!\n```json\n{\"a\": {\"b\": 1}}\n```"),
            Some("{\"a\": {\"b\": 1}}")
        );
        assert_eq!(extract_json_object("no object here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[tokio::test]
    async fn test_describe_parses_embedded_object() {
        let reply = r#"Here you go: {"title_en":"Red fox in snowy forest","title_tr":"Karlı ormanda kızıl tilki","description_en":"A fox walks through fresh snow."}"#;
        let completion = Arc::new(ScriptedCompletion::with_vision([Ok(reply.to_string())]));
        let generator = MetadataGenerator::new(completion.clone());

        let text = generator.describe(&preview(), "winter").await.unwrap();

        assert_eq!(text.title_en, "Red fox in snowy forest");
        assert_eq!(text.title_tr, "Karlı ormanda kızıl tilki");
        assert_eq!(text.description_tr, "");
        assert!(completion.last_prompt().unwrap().contains("winter"));
    }

    #[tokio::test]
    async fn test_describe_without_object_is_parse_error() {
        let completion = Arc::new(ScriptedCompletion::with_vision([Ok(
            "I cannot help with that.".to_string()
        )]));
        let generator = MetadataGenerator::new(completion);
        let err = generator.describe(&preview(), "").await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
