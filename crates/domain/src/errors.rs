//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
///
/// Constraint refusals (`BlockLimitReached`, `MediaLimitReached`, `LastBlock`)
/// always leave the composer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// The composer already holds the maximum number of blocks
    #[error("Block limit reached (max {max})")]
    BlockLimitReached { max: usize },

    /// The block already holds the maximum number of media items
    #[error("Media limit reached (max {max} per block)")]
    MediaLimitReached { max: usize },

    /// The last remaining block cannot be deleted
    #[error("Cannot delete the last remaining block")]
    LastBlock,

    /// A media reorder referenced a position outside the block's media list
    #[error("Media index out of range: {index} (len {len})")]
    MediaIndexOutOfRange { index: usize, len: usize },

    /// The selected file is neither an image nor a video
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Check if this error reports a missing entity
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
