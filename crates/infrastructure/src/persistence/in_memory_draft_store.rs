//! In-memory draft store
//!
//! Keeps the draft list in process memory. Used for tests and for sessions
//! that should not touch the disk.

use application::{error::ApplicationError, ports::DraftStoragePort};
use async_trait::async_trait;
use domain::ComposerDraft;
use tokio::sync::RwLock;

/// Draft list held in memory
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<Vec<ComposerDraft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with drafts, newest first
    pub fn with_drafts(drafts: Vec<ComposerDraft>) -> Self {
        Self {
            drafts: RwLock::new(drafts),
        }
    }

    /// Copy of the stored list
    pub async fn snapshot(&self) -> Vec<ComposerDraft> {
        self.drafts.read().await.clone()
    }
}

#[async_trait]
impl DraftStoragePort for InMemoryDraftStore {
    async fn load_drafts(&self) -> Result<Vec<ComposerDraft>, ApplicationError> {
        Ok(self.drafts.read().await.clone())
    }

    async fn save_drafts(&self, drafts: &[ComposerDraft]) -> Result<(), ApplicationError> {
        *self.drafts.write().await = drafts.to_vec();
        Ok(())
    }
}
