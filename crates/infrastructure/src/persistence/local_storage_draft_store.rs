//! Local storage draft store implementation
//!
//! Implements the `DraftStoragePort` on top of [`LocalKeyValueStore`], keeping
//! the whole draft list as one JSON array under a single key.

use std::sync::Arc;

use application::{error::ApplicationError, ports::DraftStoragePort};
use async_trait::async_trait;
use domain::ComposerDraft;
use tokio::task;
use tracing::{debug, instrument};

use super::{error::map_storage_error, key_value_store::LocalKeyValueStore};
use crate::config::DEFAULT_DRAFTS_KEY;

/// Draft list stored in local key-value storage
#[derive(Debug, Clone)]
pub struct LocalStorageDraftStore {
    store: Arc<LocalKeyValueStore>,
    key: String,
}

impl LocalStorageDraftStore {
    /// Create a draft store using the given storage key
    pub fn new(store: Arc<LocalKeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Create a draft store under the default `"composer-drafts"` key
    pub fn with_default_key(store: Arc<LocalKeyValueStore>) -> Self {
        Self::new(store, DEFAULT_DRAFTS_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl DraftStoragePort for LocalStorageDraftStore {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn load_drafts(&self) -> Result<Vec<ComposerDraft>, ApplicationError> {
        let Some(raw) = self.store.get_item(&self.key) else {
            debug!("No drafts stored yet");
            return Ok(Vec::new());
        };

        let drafts: Vec<ComposerDraft> = serde_json::from_str(&raw)?;
        debug!(count = drafts.len(), "Loaded drafts");
        Ok(drafts)
    }

    #[instrument(skip(self, drafts), fields(key = %self.key, count = drafts.len()))]
    async fn save_drafts(&self, drafts: &[ComposerDraft]) -> Result<(), ApplicationError> {
        let raw = serde_json::to_string(drafts)
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;
        let store = Arc::clone(&self.store);
        let key = self.key.clone();

        task::spawn_blocking(move || store.set_item(&key, raw))
            .await
            .map_err(|e| ApplicationError::Internal(e.to_string()))?
            .map_err(map_storage_error)?;

        debug!("Saved drafts");
        Ok(())
    }
}
