//! Error types module
//!
//! All failures a generation run can hit are unified under [`AppError`]. The
//! variants group into four categories: network/service failures, parse
//! failures, media failures and persistence failures. Callers use
//! [`AppError::category`] to decide whether a failure aborts a run or degrades.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like invalid operator input
    Debug,
    /// Warning level - for degraded but recoverable paths
    Warn,
    /// Error level - for failures that abort a run
    Error,
}

/// Error taxonomy used by the pipeline to pick a propagation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connectivity failure, non-success status or timeout
    Network,
    /// Model response missing the expected structure
    Parse,
    /// Undecodable source file or unreadable video frame
    Media,
    /// Record table, document or cache I/O failure
    Persistence,
    /// Missing credentials, bad configuration or bad operator input
    Config,
    /// Anything else
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("{service} request failed: {status} - {body}")]
    Service {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result alias used across the workspace
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Network(_) | AppError::Timeout(_) | AppError::Service { .. } => {
                ErrorCategory::Network
            }
            AppError::Parse(_) => ErrorCategory::Parse,
            AppError::Media(_) => ErrorCategory::Media,
            AppError::Persistence(_) => ErrorCategory::Persistence,
            AppError::Config(_) | AppError::InvalidInput(_) => ErrorCategory::Config,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self.category() {
            ErrorCategory::Config => LogLevel::Debug,
            ErrorCategory::Persistence => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// Whether a retry by the operator could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::Timeout(_) | AppError::Service { .. }
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Persistence(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(format!("JSON parsing error: {}", err))
    }
}
