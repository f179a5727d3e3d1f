use stockmeta_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidEntry(msg) => AppError::InvalidInput(msg),
            other => AppError::Persistence(other.to_string()),
        }
    }
}
