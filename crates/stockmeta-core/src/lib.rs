//! Stockmeta Core Library
//!
//! This crate provides the domain models, error types, configuration and keyword
//! list algorithms shared by every Stockmeta component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AppConfig, Settings};
pub use error::{AppError, AppResult, ErrorCategory, LogLevel};
pub use models::{
    fill_keywords_to_max, KeywordSet, KeywordsByPlatform, Language, Localized,
    LocalizedKeywords, MediaAsset, MediaKind, MetadataRecord, Platform, TitleDescription,
};
