//! Per-folder record tables
//!
//! A folder's records are loaded and rewritten as a whole. The [`RecordStore`]
//! trait keeps callers independent of the on-disk layout.

mod csv_table;

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use stockmeta_core::{AppResult, MetadataRecord};

pub use csv_table::{CsvRecordStore, TABLE_COLUMNS};

/// All records of one folder, keyed by absolute asset path
pub type RecordMap = BTreeMap<String, MetadataRecord>;

/// Keyed record persistence for one folder at a time.
///
/// No locking is done here: concurrent writers to the same folder must be
/// serialized by the caller. The last write for a key wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record stored for `folder`. Empty when the folder has no table yet.
    async fn load(&self, folder: &Path) -> AppResult<RecordMap>;

    /// Insert or fully overwrite `record` under its path
    async fn save(&self, folder: &Path, record: &MetadataRecord) -> AppResult<()>;
}
