//! Error types for session storage operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for session storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing durable session state
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading, writing or renaming the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document exists but is not a JSON object of strings
    #[error("Corrupt storage document at {path}: {reason}")]
    Corrupt {
        /// Location of the offending document
        path: PathBuf,
        /// Why it could not be decoded
        reason: String,
    },

    /// Encoding the document failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}
