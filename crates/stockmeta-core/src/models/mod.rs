//! Domain models

mod asset;
mod keywords;
mod language;
mod platform;
mod record;

pub use asset::{MediaAsset, MediaKind};
pub use keywords::{fill_keywords_to_max, KeywordSet};
pub use language::Language;
pub use platform::Platform;
pub use record::{KeywordsByPlatform, Localized, LocalizedKeywords, MetadataRecord, TitleDescription};
