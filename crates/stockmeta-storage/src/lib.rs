//! Stockmeta Storage Library
//!
//! Persistence for everything the pipeline keeps on disk: the operator
//! settings document, the vocabulary map and the per-folder record tables.
//!
//! Every document is rewritten wholesale on each mutation through a
//! write-to-temp-then-rename step, so readers never observe a half-written file.

pub mod document;
pub mod error;
pub mod records;
pub mod settings;
pub mod vocabulary;

pub use error::{StorageError, StorageResult};
pub use records::{CsvRecordStore, RecordMap, RecordStore};
pub use settings::SettingsStore;
pub use vocabulary::VocabularyMapper;
