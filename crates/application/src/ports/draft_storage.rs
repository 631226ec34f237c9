//! Draft storage port
//!
//! A narrow interface over the persisted draft list. The whole list is read
//! and written at once, newest first, so an in-memory fake is enough for
//! tests.

use async_trait::async_trait;
use domain::ComposerDraft;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for draft list persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DraftStoragePort: Send + Sync {
    /// Load the stored draft list, newest first
    ///
    /// # Returns
    /// An empty list when nothing has been stored yet. Undecodable content
    /// is reported as [`ApplicationError::CorruptData`].
    async fn load_drafts(&self) -> Result<Vec<ComposerDraft>, ApplicationError>;

    /// Replace the stored draft list
    ///
    /// # Arguments
    /// * `drafts` - The full list to store, newest first
    async fn save_drafts(&self, drafts: &[ComposerDraft]) -> Result<(), ApplicationError>;
}
