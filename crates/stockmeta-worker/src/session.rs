//! Coordinating context for one operator.
//!
//! [`CatalogSession`] owns the open folder, its record cache and its
//! thumbnails. Background work never touches that state directly: thumbnail
//! sequences and generation runs report over channels and the session applies
//! each message in [`CatalogSession::next_update`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use stockmeta_core::constants::{PREVIEW_HEIGHT, PREVIEW_WIDTH};
use stockmeta_core::{AppError, AppResult, MediaAsset, MediaKind, MetadataRecord, Settings};
use stockmeta_storage::{RecordMap, RecordStore, SettingsStore};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::events::{PipelineEvent, PipelineStage};
use crate::orchestrator::PipelineOrchestrator;
use crate::thumbnails::{ThumbnailEvent, ThumbnailLoader};

/// Supported assets directly inside `folder`, sorted by lowercase file name
pub async fn scan_folder(folder: &Path) -> AppResult<Vec<MediaAsset>> {
    let mut entries = tokio::fs::read_dir(folder).await.map_err(|e| {
        AppError::InvalidInput(format!("Cannot open folder {}: {}", folder.display(), e))
    })?;

    let mut assets = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        if MediaKind::from_path(&path).is_some() {
            assets.push(MediaAsset::new(&path)?);
        }
    }

    assets.sort_by_cached_key(|asset| asset.file_name().to_lowercase());
    Ok(assets)
}

/// What changed after applying one background message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    ThumbnailReady { path: String, loaded: bool },
    ThumbnailsFinished,
    PreviewReady { path: String },
    Progress { path: String, stage: PipelineStage },
    /// A run produced a record; it is editable before the autosave lands
    Generated { path: String },
    Autosaved { path: String, saved: bool },
    GenerationFailed { path: String, message: String },
    /// A message from a superseded folder load
    Stale,
}

enum Incoming {
    Thumbnail(ThumbnailEvent),
    Pipeline(PipelineEvent),
    Preview(String, Option<RgbImage>),
}

pub struct CatalogSession {
    settings_store: SettingsStore,
    settings: Settings,
    records_store: Arc<dyn RecordStore>,
    thumbnails: ThumbnailLoader,
    orchestrator: Option<Arc<PipelineOrchestrator>>,

    folder: Option<PathBuf>,
    assets: Vec<MediaAsset>,
    records: RecordMap,
    generated: HashMap<String, MetadataRecord>,
    thumbnail_images: HashMap<String, Option<RgbImage>>,
    thumbnail_generation: u64,
    selected: Option<MediaAsset>,
    preview: Option<(String, RgbImage)>,

    thumb_tx: UnboundedSender<ThumbnailEvent>,
    thumb_rx: UnboundedReceiver<ThumbnailEvent>,
    pipeline_tx: UnboundedSender<PipelineEvent>,
    pipeline_rx: UnboundedReceiver<PipelineEvent>,
    preview_tx: UnboundedSender<(String, Option<RgbImage>)>,
    preview_rx: UnboundedReceiver<(String, Option<RgbImage>)>,
}

impl CatalogSession {
    /// `orchestrator` is `None` when no completion credentials are configured;
    /// browsing and saving still work, generation does not.
    pub fn new(
        settings_store: SettingsStore,
        settings: Settings,
        records_store: Arc<dyn RecordStore>,
        thumbnails: ThumbnailLoader,
        orchestrator: Option<Arc<PipelineOrchestrator>>,
    ) -> Self {
        let (thumb_tx, thumb_rx) = mpsc::unbounded_channel();
        let (pipeline_tx, pipeline_rx) = mpsc::unbounded_channel();
        let (preview_tx, preview_rx) = mpsc::unbounded_channel();
        Self {
            settings_store,
            settings,
            records_store,
            thumbnails,
            orchestrator,
            folder: None,
            assets: Vec::new(),
            records: RecordMap::new(),
            generated: HashMap::new(),
            thumbnail_images: HashMap::new(),
            thumbnail_generation: 0,
            selected: None,
            preview: None,
            thumb_tx,
            thumb_rx,
            pipeline_tx,
            pipeline_rx,
            preview_tx,
            preview_rx,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn records(&self) -> &RecordMap {
        &self.records
    }

    pub fn has_record(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    pub fn selected(&self) -> Option<&MediaAsset> {
        self.selected.as_ref()
    }

    /// Loaded list thumbnail; `Some(None)` when loading it failed
    pub fn thumbnail(&self, path: &str) -> Option<Option<&RgbImage>> {
        self.thumbnail_images.get(path).map(Option::as_ref)
    }

    pub fn preview(&self) -> Option<&RgbImage> {
        match (&self.preview, &self.selected) {
            (Some((path, image)), Some(selected)) if *path == selected.key() => Some(image),
            _ => None,
        }
    }

    /// Most recent content for `path`: a fresh generation result, else the stored record
    pub fn current_record(&self, path: &str) -> Option<&MetadataRecord> {
        self.generated.get(path).or_else(|| self.records.get(path))
    }

    /// Rewrite the settings document with `settings`
    pub async fn update_settings(&mut self, settings: Settings) -> AppResult<()> {
        self.settings_store.save(&settings).await?;
        self.settings = settings;
        Ok(())
    }

    /// Open `folder`: list its assets, load its record table, remember it as
    /// the last folder and start the thumbnail sequence. Returns the asset count.
    pub async fn open_folder(&mut self, folder: &Path) -> AppResult<usize> {
        let folder = std::path::absolute(folder).map_err(|e| {
            AppError::InvalidInput(format!("Cannot resolve folder {}: {}", folder.display(), e))
        })?;
        let assets = scan_folder(&folder).await?;
        let records = self.records_store.load(&folder).await?;

        self.settings.save_dir = folder.to_string_lossy().into_owned();
        if let Err(e) = self.settings_store.save(&self.settings).await {
            warn!(error = %e, "Failed to remember last folder");
        }

        self.thumbnail_images.clear();
        self.generated.clear();
        self.selected = None;
        self.preview = None;
        self.thumbnail_generation = self.thumbnails.start(assets.clone(), self.thumb_tx.clone());

        info!(
            folder = %folder.display(),
            assets = assets.len(),
            records = records.len(),
            "Folder opened"
        );
        self.folder = Some(folder);
        self.assets = assets;
        self.records = records;
        Ok(self.assets.len())
    }

    /// Make `path` the current asset. Its preview loads in the background;
    /// the stored record, if any, is returned immediately.
    pub fn select(&mut self, path: &Path) -> AppResult<Option<&MetadataRecord>> {
        let asset = MediaAsset::new(path)?;
        let key = asset.key();

        let preprocessor = Arc::clone(self.thumbnails.preprocessor());
        let tx = self.preview_tx.clone();
        let target = asset.clone();
        tokio::spawn(async move {
            let image = match preprocessor.thumbnail(&target, PREVIEW_WIDTH, PREVIEW_HEIGHT).await {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!(path = %target, error = %e, "Preview unavailable");
                    None
                }
            };
            let _ = tx.send((target.key(), image));
        });

        self.selected = Some(asset);
        Ok(self.current_record(&key))
    }

    /// Start a generation run for the selected asset
    pub fn generate_selected(&mut self, hint: &str) -> AppResult<()> {
        let asset = self
            .selected
            .clone()
            .ok_or_else(|| AppError::InvalidInput("Select a file first".to_string()))?;
        let orchestrator = self.orchestrator.as_ref().ok_or_else(|| {
            AppError::Config("Set the Groq API key in settings before generating".to_string())
        })?;

        orchestrator.spawn_generation(asset, hint.trim().to_string(), self.pipeline_tx.clone());
        Ok(())
    }

    /// Operator-initiated save; stamps the record with the current time.
    /// Errors are returned, unlike autosave.
    pub async fn save_record(&mut self, mut record: MetadataRecord) -> AppResult<()> {
        let folder = Path::new(&record.path)
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Record path has no folder: {}", record.path))
            })?;
        record.touch();
        self.records_store.save(&folder, &record).await?;

        self.generated.remove(&record.path);
        if self.folder.as_deref() == Some(folder.as_path()) {
            self.records.insert(record.path.clone(), record);
        }
        Ok(())
    }

    /// Wait for the next message from background work and apply it
    pub async fn next_update(&mut self) -> SessionUpdate {
        let incoming = tokio::select! {
            Some(event) = self.thumb_rx.recv() => Incoming::Thumbnail(event),
            Some(event) = self.pipeline_rx.recv() => Incoming::Pipeline(event),
            Some((path, image)) = self.preview_rx.recv() => Incoming::Preview(path, image),
        };

        match incoming {
            Incoming::Thumbnail(event) => self.apply_thumbnail(event),
            Incoming::Pipeline(event) => self.apply_pipeline(event),
            Incoming::Preview(path, image) => self.apply_preview(path, image),
        }
    }

    fn apply_thumbnail(&mut self, event: ThumbnailEvent) -> SessionUpdate {
        if event.generation() != self.thumbnail_generation {
            return SessionUpdate::Stale;
        }
        match event {
            ThumbnailEvent::Ready { path, image, .. } => {
                let loaded = image.is_some();
                self.thumbnail_images.insert(path.clone(), image);
                SessionUpdate::ThumbnailReady { path, loaded }
            }
            ThumbnailEvent::Finished { .. } => SessionUpdate::ThumbnailsFinished,
        }
    }

    fn apply_pipeline(&mut self, event: PipelineEvent) -> SessionUpdate {
        match event {
            PipelineEvent::Progress { path, stage } => SessionUpdate::Progress { path, stage },
            PipelineEvent::Finished { record } => {
                let path = record.path.clone();
                self.generated.insert(path.clone(), record);
                SessionUpdate::Generated { path }
            }
            PipelineEvent::Autosaved { record, saved } => {
                let path = record.path.clone();
                let in_open_folder = Path::new(&path).parent() == self.folder.as_deref();
                if saved && in_open_folder {
                    self.records.insert(path.clone(), record);
                }
                SessionUpdate::Autosaved { path, saved }
            }
            PipelineEvent::Failed { path, error } => SessionUpdate::GenerationFailed {
                path,
                message: error.to_string(),
            },
        }
    }

    fn apply_preview(&mut self, path: String, image: Option<RgbImage>) -> SessionUpdate {
        let is_selected = self.selected.as_ref().is_some_and(|s| s.key() == path);
        match image {
            Some(image) if is_selected => {
                self.preview = Some((path.clone(), image));
                SessionUpdate::PreviewReady { path }
            }
            _ => SessionUpdate::Stale,
        }
    }
}
