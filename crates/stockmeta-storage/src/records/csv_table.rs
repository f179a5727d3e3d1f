use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use stockmeta_core::constants::{CREATED_AT_FORMAT, RECORD_TABLE_FILE};
use stockmeta_core::{
    AppResult, KeywordSet, KeywordsByPlatform, Localized, LocalizedKeywords, MetadataRecord,
};
use tracing::{info, warn};

use super::{RecordMap, RecordStore};
use crate::document::write_atomic;
use crate::error::{StorageError, StorageResult};

/// Column order of the record table
pub const TABLE_COLUMNS: [&str; 13] = [
    "file_path",
    "file_name",
    "created_at",
    "title_en",
    "title_tr",
    "description_en",
    "description_tr",
    "adobe_keywords_en",
    "adobe_keywords_tr",
    "shutter_keywords_en",
    "shutter_keywords_tr",
    "istock_keywords_en",
    "istock_keywords_tr",
];

/// One table row. Field order must match [`TABLE_COLUMNS`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RecordRow {
    file_path: String,
    file_name: String,
    created_at: String,
    title_en: String,
    title_tr: String,
    description_en: String,
    description_tr: String,
    adobe_keywords_en: String,
    adobe_keywords_tr: String,
    shutter_keywords_en: String,
    shutter_keywords_tr: String,
    istock_keywords_en: String,
    istock_keywords_tr: String,
}

impl From<&MetadataRecord> for RecordRow {
    fn from(record: &MetadataRecord) -> Self {
        let kw = &record.keywords;
        Self {
            file_path: record.path.clone(),
            file_name: record.file_name.clone(),
            created_at: record.created_at.format(CREATED_AT_FORMAT).to_string(),
            title_en: record.title.en.clone(),
            title_tr: record.title.tr.clone(),
            description_en: record.description.en.clone(),
            description_tr: record.description.tr.clone(),
            adobe_keywords_en: kw.adobe.en.join(),
            adobe_keywords_tr: kw.adobe.tr.join(),
            shutter_keywords_en: kw.shutterstock.en.join(),
            shutter_keywords_tr: kw.shutterstock.tr.join(),
            istock_keywords_en: kw.istock.en.join(),
            istock_keywords_tr: kw.istock.tr.join(),
        }
    }
}

impl RecordRow {
    fn into_record(self) -> MetadataRecord {
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .unwrap_or_else(|e| {
                warn!(path = %self.file_path, value = %self.created_at, error = %e, "Unparseable created_at");
                NaiveDateTime::default()
            });
        let pair = |en: &str, tr: &str| LocalizedKeywords {
            en: KeywordSet::parse_joined(en),
            tr: KeywordSet::parse_joined(tr),
        };

        MetadataRecord {
            keywords: KeywordsByPlatform {
                adobe: pair(&self.adobe_keywords_en, &self.adobe_keywords_tr),
                shutterstock: pair(&self.shutter_keywords_en, &self.shutter_keywords_tr),
                istock: pair(&self.istock_keywords_en, &self.istock_keywords_tr),
            },
            path: self.file_path,
            file_name: self.file_name,
            created_at,
            title: Localized::new(self.title_en, self.title_tr),
            description: Localized::new(self.description_en, self.description_tr),
        }
    }
}

/// Record table stored as `<folder>/_metadata.csv`, rewritten in full on every save
#[derive(Debug, Clone, Default)]
pub struct CsvRecordStore;

impl CsvRecordStore {
    pub fn new() -> Self {
        Self
    }

    pub fn table_path(folder: &Path) -> PathBuf {
        folder.join(RECORD_TABLE_FILE)
    }

    fn parse(path: &Path, bytes: &[u8]) -> StorageResult<RecordMap> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
        let mut records = RecordMap::new();
        for row in reader.deserialize::<RecordRow>() {
            let row = row.map_err(|e| StorageError::Malformed(format!("{}: {}", path.display(), e)))?;
            if row.file_path.is_empty() {
                continue;
            }
            records.insert(row.file_path.clone(), row.into_record());
        }
        Ok(records)
    }

    fn render(records: &RecordMap) -> StorageResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(TABLE_COLUMNS)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        for record in records.values() {
            let row = RecordRow::from(record);
            writer
                .serialize(&row)
                .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| StorageError::WriteFailed(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    async fn load(&self, folder: &Path) -> AppResult<RecordMap> {
        let path = Self::table_path(folder);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordMap::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))
                .into())
            }
        };
        Ok(Self::parse(&path, &bytes)?)
    }

    async fn save(&self, folder: &Path, record: &MetadataRecord) -> AppResult<()> {
        let mut records = self.load(folder).await?;
        records.insert(record.path.clone(), record.clone());

        let path = Self::table_path(folder);
        let bytes = Self::render(&records)?;
        write_atomic(&path, &bytes).await?;

        info!(
            path = %record.path,
            table = %path.display(),
            rows = records.len(),
            "Record saved"
        );
        Ok(())
    }
}
