//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage backend failed (read, write or quota)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored data could not be decoded
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// The submission gateway rejected the post
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Local preview reference could not be created
    #[error("Media preview error: {0}")]
    MediaPreview(String),

    /// Operation not allowed in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Operation exists but has no behavior yet
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Submission(_))
    }

    /// Check if this error wraps a domain not-found
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(err) if err.is_not_found())
    }
}

impl From<serde_json::Error> for ApplicationError {
    fn from(err: serde_json::Error) -> Self {
        Self::CorruptData(err.to_string())
    }
}
