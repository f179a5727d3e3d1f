//! Wiring shared by the `stockmeta` commands.

use std::path::Path;
use std::sync::Arc;

use stockmeta_core::{
    AppConfig, AppError, AppResult, KeywordSet, MediaAsset, MetadataRecord, Platform, Settings,
};
use stockmeta_plugins::{CompletionService, EverypixelClient, GroqClient, TaggingService};
use stockmeta_processing::{FrameExtractor, MediaPreprocessor, ThumbnailCache};
use stockmeta_storage::{CsvRecordStore, RecordStore, SettingsStore, VocabularyMapper};
use stockmeta_worker::{CatalogSession, PipelineOrchestrator, PipelineServices, ThumbnailLoader};

/// Settings fields accepted by `settings set`
pub const SETTING_FIELDS: [&str; 4] = [
    "groq_api_key",
    "everypixels_id",
    "everypixels_secret",
    "save_dir",
];

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Assign one settings field by name
pub fn set_setting(settings: &mut Settings, field: &str, value: &str) -> AppResult<()> {
    let value = value.trim().to_string();
    match field {
        "groq_api_key" => settings.groq_api_key = value,
        "everypixels_id" => settings.everypixels_id = value,
        "everypixels_secret" => settings.everypixels_secret = value,
        "save_dir" => settings.save_dir = value,
        other => {
            return Err(AppError::InvalidInput(format!(
                "Unknown setting '{}'; expected one of: {}",
                other,
                SETTING_FIELDS.join(", ")
            )))
        }
    }
    Ok(())
}

/// Rewrite a record's iStock English list through the vocabulary map.
/// Returns how many terms were replaced.
pub async fn map_istock(vocabulary: &VocabularyMapper, record: &mut MetadataRecord) -> usize {
    let current = record.keywords.istock.en.terms();
    let mapped = vocabulary.apply(current).await;
    let replaced = mapped.iter().zip(current).filter(|(m, c)| m != c).count();
    record.keywords.istock.en = KeywordSet::from_terms(mapped, Platform::Istock.max_keywords());
    replaced
}

/// Stores and services resolved from configuration and the settings document
pub struct Runtime {
    pub config: AppConfig,
    pub settings_store: SettingsStore,
    pub settings: Settings,
    pub records: Arc<dyn RecordStore>,
    pub vocabulary: Arc<VocabularyMapper>,
    pub preprocessor: Arc<MediaPreprocessor>,
}

impl Runtime {
    pub async fn load(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let settings_store = SettingsStore::new(config.settings_path());
        let settings = settings_store.load().await;
        let preprocessor = MediaPreprocessor::new(
            ThumbnailCache::new(config.thumbnail_dir()),
            FrameExtractor::new(config.ffmpeg_path.clone())?,
        );

        Ok(Self {
            vocabulary: Arc::new(VocabularyMapper::new(config.vocabulary_path())),
            records: Arc::new(CsvRecordStore::new()),
            preprocessor: Arc::new(preprocessor),
            settings_store,
            settings,
            config,
        })
    }

    pub fn completion(&self) -> AppResult<Arc<dyn CompletionService>> {
        let client = GroqClient::new(&self.config, self.settings.groq_api_key.clone())?;
        Ok(Arc::new(client))
    }

    /// Tagging client, present only when both credential halves are set
    pub fn tagging(&self) -> AppResult<Option<Arc<dyn TaggingService>>> {
        match self.settings.tagging_credentials() {
            Some((id, secret)) => {
                let client = EverypixelClient::new(&self.config, id, secret)?;
                Ok(Some(Arc::new(client)))
            }
            None => Ok(None),
        }
    }

    pub fn orchestrator(&self) -> AppResult<PipelineOrchestrator> {
        Ok(PipelineOrchestrator::new(PipelineServices {
            preprocessor: self.preprocessor.clone(),
            completion: self.completion()?,
            tagging: self.tagging()?,
            vocabulary: self.vocabulary.clone(),
            records: self.records.clone(),
        }))
    }

    /// Catalog session over the configured stores. Generation is only wired
    /// in when a completion key is set.
    pub fn session(&self) -> AppResult<CatalogSession> {
        let orchestrator = if self.settings.has_groq_key() {
            Some(Arc::new(self.orchestrator()?))
        } else {
            None
        };
        Ok(CatalogSession::new(
            self.settings_store.clone(),
            self.settings.clone(),
            self.records.clone(),
            ThumbnailLoader::new(self.preprocessor.clone()),
            orchestrator,
        ))
    }

    /// The stored record for `file`, read from its folder's table
    pub async fn stored_record(&self, file: &Path) -> AppResult<MetadataRecord> {
        let asset = MediaAsset::new(file)?;
        let mut records = self.records.load(asset.folder()).await?;
        records
            .remove(&asset.key())
            .ok_or_else(|| AppError::InvalidInput(format!("No stored record for {}", asset)))
    }

    /// Stamp `record` with the current time and write it back into its folder's table
    pub async fn save_record(&self, record: &mut MetadataRecord) -> AppResult<()> {
        let asset = MediaAsset::new(&record.path)?;
        record.touch();
        self.records.save(asset.folder(), record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockmeta_core::{KeywordsByPlatform, TitleDescription};
    use tempfile::tempdir;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("gün batımı", 10), "gün batımı");
        assert_eq!(truncate_string("gün batımı manzarası", 9), "gün ba...");
    }

    #[test]
    fn set_setting_rejects_unknown_field() {
        let mut settings = Settings::default();
        set_setting(&mut settings, "groq_api_key", "  gsk_123 ").unwrap();
        assert_eq!(settings.groq_api_key, "gsk_123");
        assert!(matches!(
            set_setting(&mut settings, "openai_key", "x"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn map_istock_rewrites_only_known_terms() {
        let dir = tempdir().unwrap();
        let vocabulary = VocabularyMapper::new(dir.path().join("istock_learned.json"));
        vocabulary.upsert("Ocean", "Sea").await.unwrap();

        let mut keywords = KeywordsByPlatform::default();
        keywords.istock.en = KeywordSet::unbounded(["ocean", "sunset", "sea"]);
        let asset = MediaAsset::new(dir.path().join("a.jpg")).unwrap();
        let mut record = MetadataRecord::new(&asset, TitleDescription::default(), keywords);

        assert_eq!(map_istock(&vocabulary, &mut record).await, 1);
        assert_eq!(record.keywords.istock.en.join(), "Sea, sunset");
    }

    #[tokio::test]
    async fn runtime_without_key_has_no_generation() {
        let dir = tempdir().unwrap();
        let runtime = Runtime::load(AppConfig::with_home(dir.path())).await.unwrap();

        assert!(matches!(runtime.orchestrator(), Err(AppError::Config(_))));
        assert!(runtime.tagging().unwrap().is_none());

        let folder = dir.path().join("photos");
        std::fs::create_dir(&folder).unwrap();
        std::fs::write(folder.join("a.jpg"), b"jpeg").unwrap();
        let mut session = runtime.session().unwrap();
        session.open_folder(&folder).await.unwrap();
        session.select(&folder.join("a.jpg")).unwrap();
        assert!(matches!(
            session.generate_selected(""),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn stored_record_requires_table_entry() {
        let dir = tempdir().unwrap();
        let runtime = Runtime::load(AppConfig::with_home(dir.path())).await.unwrap();
        let err = runtime
            .stored_record(&dir.path().join("missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn replace_then_save_round_trips_through_table() {
        let dir = tempdir().unwrap();
        let runtime = Runtime::load(AppConfig::with_home(dir.path().join("home")))
            .await
            .unwrap();
        let file = dir.path().join("a.jpg");
        let asset = MediaAsset::new(&file).unwrap();
        let text = TitleDescription {
            title_en: "Red car".to_string(),
            ..Default::default()
        };
        let mut record = MetadataRecord::new(&asset, text, KeywordsByPlatform::default());
        runtime.save_record(&mut record).await.unwrap();

        let mut stored = runtime.stored_record(&file).await.unwrap();
        assert_eq!(stored.replace_all("RED", "blue"), 1);
        stored.created_at = Default::default();
        let epoch = stored.created_at;
        runtime.save_record(&mut stored).await.unwrap();

        let reloaded = runtime.stored_record(&file).await.unwrap();
        assert_eq!(reloaded.title.en, "blue car");
        assert_ne!(reloaded.created_at, epoch);
    }
}
