//! Stockmeta Plugins Library
//!
//! The language-model backed parts of the pipeline: HTTP clients for the
//! completion and tagging services, the prompts sent to them, and the
//! components built on top (keyword synthesis, title/description generation,
//! translation).

pub mod everypixel;
pub mod groq;
mod http;
pub mod keywords;
pub mod metadata;
pub mod prompts;
pub mod services;
pub mod translation;

pub use everypixel::EverypixelClient;
pub use groq::GroqClient;
pub use keywords::{sanitize_keywords, KeywordSynthesizer};
pub use metadata::{extract_json_object, MetadataGenerator};
pub use services::{CompletionService, TaggingService};
pub use translation::TranslationService;

// Scripted service doubles
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
