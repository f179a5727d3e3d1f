use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stockmeta_core::constants::{AUTOSAVE_DELAY_MS, MODEL_INPUT_MAX_DIM};
use stockmeta_core::{
    AppError, AppResult, KeywordSet, KeywordsByPlatform, Language, MediaAsset, MetadataRecord,
    Platform,
};
use stockmeta_plugins::{
    CompletionService, KeywordSynthesizer, MetadataGenerator, TaggingService, TranslationService,
};
use stockmeta_processing::MediaPreprocessor;
use stockmeta_storage::{RecordStore, VocabularyMapper};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::events::{PipelineError, PipelineEvent, PipelineStage};

/// Collaborators a pipeline is built from
pub struct PipelineServices {
    pub preprocessor: Arc<MediaPreprocessor>,
    pub completion: Arc<dyn CompletionService>,
    pub tagging: Option<Arc<dyn TaggingService>>,
    pub vocabulary: Arc<VocabularyMapper>,
    pub records: Arc<dyn RecordStore>,
}

/// Runs one asset through every generation stage.
///
/// Stages run strictly in sequence inside a single task, so a run issues its
/// network requests one at a time. A failing stage ends the run and nothing it
/// produced is kept.
pub struct PipelineOrchestrator {
    preprocessor: Arc<MediaPreprocessor>,
    metadata: MetadataGenerator,
    keywords: KeywordSynthesizer,
    translation: TranslationService,
    vocabulary: Arc<VocabularyMapper>,
    records: Arc<dyn RecordStore>,
    autosave_delay: Duration,
}

impl PipelineOrchestrator {
    pub fn new(services: PipelineServices) -> Self {
        Self {
            preprocessor: services.preprocessor,
            metadata: MetadataGenerator::new(services.completion.clone()),
            keywords: KeywordSynthesizer::new(services.completion.clone(), services.tagging),
            translation: TranslationService::new(services.completion),
            vocabulary: services.vocabulary,
            records: services.records,
            autosave_delay: Duration::from_millis(AUTOSAVE_DELAY_MS),
        }
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    pub fn translation(&self) -> &TranslationService {
        &self.translation
    }

    pub fn vocabulary(&self) -> &VocabularyMapper {
        &self.vocabulary
    }

    /// Run every stage for `asset`, reporting each transition on `progress`
    pub async fn generate(
        &self,
        asset: &MediaAsset,
        hint: &str,
        progress: &UnboundedSender<PipelineEvent>,
    ) -> Result<MetadataRecord, PipelineError> {
        let path = asset.key();
        let notify = |stage: PipelineStage| {
            let _ = progress.send(PipelineEvent::Progress {
                path: path.clone(),
                stage,
            });
        };

        let started = std::time::Instant::now();
        info!(path = %asset, kind = %asset.kind(), "Generation started");

        match self.run_stages(asset, hint, &notify).await {
            Ok(record) => {
                info!(
                    path = %asset,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Generation finished"
                );
                Ok(record)
            }
            Err(e) => {
                error!(path = %asset, stage = %e.stage, error = %e.source, "Generation failed");
                notify(PipelineStage::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        asset: &MediaAsset,
        hint: &str,
        notify: &(impl Fn(PipelineStage) + Sync),
    ) -> Result<MetadataRecord, PipelineError> {
        notify(PipelineStage::Preprocessing);
        let preview = self
            .preprocessor
            .encoded_preview(asset, MODEL_INPUT_MAX_DIM)
            .await
            .map_err(PipelineError::at(PipelineStage::Preprocessing))?;

        notify(PipelineStage::SynthesizingText);
        let text = self
            .metadata
            .describe(&preview, hint)
            .await
            .map_err(PipelineError::at(PipelineStage::SynthesizingText))?;

        let mut keywords = KeywordsByPlatform::default();
        for platform in Platform::ALL {
            let stage = PipelineStage::SynthesizingKeywords(platform);
            notify(stage);
            keywords.get_mut(platform).en = self
                .keywords
                .synthesize(asset, &preview, platform, hint)
                .await
                .map_err(PipelineError::at(stage))?;
        }

        notify(PipelineStage::Mapping);
        let mapped = self.vocabulary.apply(keywords.istock.en.terms()).await;
        keywords.istock.en = KeywordSet::from_terms(mapped, Platform::Istock.max_keywords());

        for platform in Platform::ALL {
            notify(PipelineStage::Translating(platform));
            let sets = keywords.get_mut(platform);
            let translated = self
                .translation
                .translate_list(sets.en.terms(), Language::Tr)
                .await;
            sets.tr = KeywordSet::from_terms(translated, platform.max_keywords());
        }

        notify(PipelineStage::Assembling);
        Ok(MetadataRecord::new(asset, text, keywords))
    }

    /// Run [`generate`](Self::generate) in its own task, then autosave.
    ///
    /// The outcome arrives on `events` as `Finished` or `Failed` as soon as the
    /// run ends. The delayed autosave reports separately as `Autosaved`; its
    /// failures are logged, never surfaced as errors.
    pub fn spawn_generation(
        self: &Arc<Self>,
        asset: MediaAsset,
        hint: String,
        events: UnboundedSender<PipelineEvent>,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let record = match this.generate(&asset, &hint, &events).await {
                Ok(record) => record,
                Err(error) => {
                    let _ = events.send(PipelineEvent::Failed {
                        path: asset.key(),
                        error,
                    });
                    return;
                }
            };
            if events
                .send(PipelineEvent::Finished {
                    record: record.clone(),
                })
                .is_err()
            {
                debug!(path = %asset, "Result receiver gone, autosaving anyway");
            }

            tokio::time::sleep(this.autosave_delay).await;
            let saved = match this.records.save(asset.folder(), &record).await {
                Ok(()) => {
                    let _ = events.send(PipelineEvent::Progress {
                        path: record.path.clone(),
                        stage: PipelineStage::Saved,
                    });
                    true
                }
                Err(e) => {
                    warn!(path = %asset, error = %e, "Autosave failed");
                    false
                }
            };
            let _ = events.send(PipelineEvent::Autosaved { record, saved });
        })
    }

    /// Operator-initiated save. Stamps the record with the current time;
    /// errors are returned to the caller.
    pub async fn save(&self, record: &mut MetadataRecord) -> AppResult<()> {
        let folder = Path::new(&record.path).parent().ok_or_else(|| {
            AppError::InvalidInput(format!("Record path has no folder: {}", record.path))
        })?;
        let folder = folder.to_path_buf();
        record.touch();
        self.records.save(&folder, record).await
    }
}
