//! Stockmeta Worker Library
//!
//! Runs generation off the interactive path. [`PipelineOrchestrator`] runs one
//! asset through every stage in a spawned task and reports progress over a
//! channel; [`ThumbnailLoader`] populates folder listings in a throttled
//! background sequence; [`CatalogSession`] is the single owner of per-folder
//! state and applies the results both send back.

pub mod events;
pub mod orchestrator;
pub mod session;
pub mod thumbnails;

pub use events::{PipelineError, PipelineEvent, PipelineStage};
pub use orchestrator::{PipelineOrchestrator, PipelineServices};
pub use session::{scan_folder, CatalogSession, SessionUpdate};
pub use thumbnails::{ThumbnailEvent, ThumbnailLoader};
