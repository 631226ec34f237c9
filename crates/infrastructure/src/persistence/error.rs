//! Storage errors and their mapping to the application layer

use application::error::ApplicationError;
use thiserror::Error;

/// Errors raised by the local key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The write would exceed the configured byte quota
    #[error("Quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: u64, quota: u64 },
}

/// Map a storage error to an application-layer error
pub fn map_storage_error(e: StorageError) -> ApplicationError {
    match e {
        StorageError::Serialization(err) => ApplicationError::CorruptData(err.to_string()),
        other => ApplicationError::Storage(other.to_string()),
    }
}
