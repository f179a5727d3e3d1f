//! Operator-curated mapping from general terms to iStock's preferred vocabulary.
//!
//! The map lives only on disk. Every lookup re-reads the document and every
//! edit rewrites it before returning, so independent consumers always agree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stockmeta_core::AppResult;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::document::{load_json, save_json};
use crate::error::{StorageError, StorageResult};

pub type VocabularyMap = BTreeMap<String, String>;

pub struct VocabularyMapper {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl VocabularyMapper {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace each term found in the map, keep the rest. Same length and order as `terms`.
    pub async fn apply<S: AsRef<str>>(&self, terms: &[S]) -> Vec<String> {
        let map = self.read_lenient().await;
        let mut replaced = 0usize;
        let mapped = terms
            .iter()
            .map(|term| {
                let term = term.as_ref();
                match map.get(&normalize(term)) {
                    Some(target) => {
                        replaced += 1;
                        target.clone()
                    }
                    None => term.to_string(),
                }
            })
            .collect();
        debug!(replaced, total = terms.len(), "Applied vocabulary map");
        mapped
    }

    /// Current entries, sorted by general term
    pub async fn entries(&self) -> AppResult<VocabularyMap> {
        Ok(self.read_strict().await?)
    }

    pub async fn upsert(&self, general: &str, platform_term: &str) -> AppResult<()> {
        let key = normalize(general);
        let value = platform_term.trim();
        if key.is_empty() || value.is_empty() {
            return Err(StorageError::InvalidEntry(
                "Vocabulary entries need both a general and a platform term".to_string(),
            )
            .into());
        }
        if value.contains(',') {
            return Err(StorageError::InvalidEntry(format!(
                "Platform term '{}' must be a single keyword without commas",
                value
            ))
            .into());
        }

        let _guard = self.write_lock.lock().await;
        let mut map = self.read_strict().await?;
        map.insert(key, value.to_string());
        save_json(&self.path, &map).await?;
        Ok(())
    }

    /// Remove an entry. Returns whether it existed.
    pub async fn remove(&self, general: &str) -> AppResult<bool> {
        let key = normalize(general);
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_strict().await?;
        if map.remove(&key).is_none() {
            return Ok(false);
        }
        save_json(&self.path, &map).await?;
        Ok(true)
    }

    async fn read_strict(&self) -> StorageResult<VocabularyMap> {
        Ok(load_json(&self.path).await?.unwrap_or_default())
    }

    // Lookups degrade to an empty map rather than failing a generation run.
    async fn read_lenient(&self) -> VocabularyMap {
        match self.read_strict().await {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Vocabulary map unreadable, applying none");
                VocabularyMap::new()
            }
        }
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}
