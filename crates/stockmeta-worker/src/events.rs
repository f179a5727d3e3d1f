use std::fmt;

use stockmeta_core::{AppError, MetadataRecord, Platform};
use thiserror::Error;

/// States of one generation run, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Preprocessing,
    SynthesizingText,
    SynthesizingKeywords(Platform),
    Mapping,
    Translating(Platform),
    Assembling,
    Saved,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Saved | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "idle"),
            PipelineStage::Preprocessing => write!(f, "analysing image"),
            PipelineStage::SynthesizingText => write!(f, "writing title and description"),
            PipelineStage::SynthesizingKeywords(p) => {
                write!(f, "generating {} keywords", p.display_name())
            }
            PipelineStage::Mapping => write!(f, "applying vocabulary map"),
            PipelineStage::Translating(p) => {
                write!(f, "translating {} keywords", p.display_name())
            }
            PipelineStage::Assembling => write!(f, "assembling record"),
            PipelineStage::Saved => write!(f, "saved"),
            PipelineStage::Failed => write!(f, "failed"),
        }
    }
}

/// The one error a failed run surfaces: where it stopped and why
#[derive(Debug, Error)]
#[error("Generation failed while {stage}: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: AppError,
}

impl PipelineError {
    /// `map_err` adapter tagging an error with the stage it occurred in
    pub fn at(stage: PipelineStage) -> impl FnOnce(AppError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Messages a spawned run sends back to its coordinator
#[derive(Debug)]
pub enum PipelineEvent {
    Progress { path: String, stage: PipelineStage },
    /// The run succeeded. Sent before the autosave starts.
    Finished { record: MetadataRecord },
    /// Outcome of the best-effort save that follows a successful run
    Autosaved { record: MetadataRecord, saved: bool },
    Failed { path: String, error: PipelineError },
}

impl PipelineEvent {
    pub fn path(&self) -> &str {
        match self {
            PipelineEvent::Progress { path, .. } | PipelineEvent::Failed { path, .. } => path,
            PipelineEvent::Finished { record } | PipelineEvent::Autosaved { record, .. } => {
                &record.path
            }
        }
    }
}
