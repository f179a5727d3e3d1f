//! Shared fixtures for the worker integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use stockmeta_core::{AppError, AppResult, MetadataRecord};
use stockmeta_plugins::test_helpers::ScriptedCompletion;
use stockmeta_plugins::CompletionService;
use stockmeta_processing::{FrameExtractor, MediaPreprocessor, ThumbnailCache};
use stockmeta_storage::{CsvRecordStore, RecordMap, RecordStore, VocabularyMapper};
use stockmeta_worker::{PipelineEvent, PipelineOrchestrator, PipelineServices};
use tokio::sync::mpsc::UnboundedReceiver;

pub const METADATA_REPLY: &str = r#"Here you go:
{"title_en": "Sunset over a quiet beach", "title_tr": "Sessiz bir plajda gün batımı",
 "description_en": "Warm evening light over calm sea", "description_tr": "Sakin deniz üzerinde sıcak akşam ışığı"}"#;

pub fn write_png(path: &Path, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, Rgb([200, 120, 40]))
        .save(path)
        .unwrap();
}

pub fn preprocessor(home: &Path) -> Arc<MediaPreprocessor> {
    Arc::new(MediaPreprocessor::new(
        ThumbnailCache::new(home.join("thumbs")),
        FrameExtractor::new(home.join("no-ffmpeg").to_string_lossy()).unwrap(),
    ))
}

pub fn numbered(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct Harness {
    pub completion: Arc<ScriptedCompletion>,
    pub vocabulary: Arc<VocabularyMapper>,
    pub orchestrator: Arc<PipelineOrchestrator>,
}

pub fn harness(home: &Path, records: Arc<dyn RecordStore>) -> Harness {
    harness_with_delay(home, records, Duration::ZERO)
}

pub fn harness_with_delay(
    home: &Path,
    records: Arc<dyn RecordStore>,
    autosave_delay: Duration,
) -> Harness {
    let completion = Arc::new(ScriptedCompletion::default());
    let vocabulary = Arc::new(VocabularyMapper::new(home.join("istock_learned.json")));
    let orchestrator = PipelineOrchestrator::new(PipelineServices {
        preprocessor: preprocessor(home),
        completion: completion.clone() as Arc<dyn CompletionService>,
        tagging: None,
        vocabulary: vocabulary.clone(),
        records,
    })
    .with_autosave_delay(autosave_delay);

    Harness {
        completion,
        vocabulary,
        orchestrator: Arc::new(orchestrator),
    }
}

pub fn csv_store() -> Arc<dyn RecordStore> {
    Arc::new(CsvRecordStore::new())
}

/// Events up to and including the autosave outcome, or the failure
pub async fn collect_run(rx: &mut UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = matches!(
            event,
            PipelineEvent::Autosaved { .. } | PipelineEvent::Failed { .. }
        );
        events.push(event);
        if done {
            break;
        }
    }
    events
}

/// A record store whose every operation fails
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn load(&self, _folder: &Path) -> AppResult<RecordMap> {
        Err(AppError::Persistence("disk unavailable".to_string()))
    }

    async fn save(&self, _folder: &Path, _record: &MetadataRecord) -> AppResult<()> {
        Err(AppError::Persistence("disk unavailable".to_string()))
    }
}

pub fn folder_with(dir: &Path, names: &[&str]) -> PathBuf {
    let folder = dir.join("photos");
    std::fs::create_dir_all(&folder).unwrap();
    for name in names {
        let path = folder.join(name);
        match path.extension().and_then(|e| e.to_str()) {
            Some("png") => write_png(&path, 64, 48),
            _ => std::fs::write(&path, b"not decoded by this test").unwrap(),
        }
    }
    folder
}
