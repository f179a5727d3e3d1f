use std::path::{Path, PathBuf};

use stockmeta_core::{AppResult, Settings};
use tracing::warn;

use crate::document::{load_json, save_json};

/// Loads and rewrites the operator settings document
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings. A missing or unreadable document yields defaults.
    pub async fn load(&self) -> Settings {
        match load_json(&self.path).await {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Settings unreadable, using defaults");
                Settings::default()
            }
        }
    }

    pub async fn save(&self, settings: &Settings) -> AppResult<()> {
        save_json(&self.path, settings).await?;
        Ok(())
    }
}
