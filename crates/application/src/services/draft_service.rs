//! Draft Service - Autosave history and draft rehydration
//!
//! The history is a single list, newest first, capped at `max_drafts`.
//! Autosave is best effort: a failed write is logged and the tick dropped,
//! the next tick simply tries again.

use std::sync::Arc;

use domain::{Composer, ComposerBlock, ComposerDraft, DomainError, DraftId, ReplyPolicy, Sentiment};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{error::ApplicationError, ports::DraftStoragePort};

/// Default number of drafts kept in the history
pub const DEFAULT_MAX_DRAFTS: usize = 20;

/// What a single autosave tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveOutcome {
    /// A new snapshot was stored
    Saved(DraftId),
    /// The composer had no content
    Skipped,
    /// Storage failed; nothing was written
    Failed,
}

/// Composer state rebuilt from a draft
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredDraft {
    pub draft_id: DraftId,
    pub blocks: Vec<ComposerBlock>,
    pub reply_policy: ReplyPolicy,
    pub sentiment: Option<Sentiment>,
    /// Media items that existed in the draft but could not be restored
    pub dropped_media: usize,
}

/// Result of asking to open a draft
#[derive(Debug, Clone, PartialEq)]
pub enum DraftRestore {
    /// The draft had media; the caller must confirm that it will be lost
    NeedsConfirmation { media_count: usize },
    /// The draft was rebuilt
    Restored(RestoredDraft),
}

/// Service for draft persistence
pub struct DraftService {
    storage: Arc<dyn DraftStoragePort>,
    max_drafts: usize,
    /// Serializes load, prepend and save so concurrent saves keep every draft
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for DraftService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftService")
            .field("max_drafts", &self.max_drafts)
            .finish_non_exhaustive()
    }
}

impl DraftService {
    /// Create a new draft service keeping the default history size
    pub fn new(storage: Arc<dyn DraftStoragePort>) -> Self {
        Self::with_max_drafts(storage, DEFAULT_MAX_DRAFTS)
    }

    /// Create a new draft service with a custom history size
    pub fn with_max_drafts(storage: Arc<dyn DraftStoragePort>, max_drafts: usize) -> Self {
        Self {
            storage,
            max_drafts,
            write_lock: Mutex::new(()),
        }
    }

    pub const fn max_drafts(&self) -> usize {
        self.max_drafts
    }

    /// Snapshot the composer into the history, swallowing storage failures
    #[instrument(skip(self, composer))]
    pub async fn autosave(&self, composer: &Composer) -> AutosaveOutcome {
        let Some(draft) = ComposerDraft::capture(composer) else {
            debug!("Nothing to autosave");
            return AutosaveOutcome::Skipped;
        };

        match self.store(draft).await {
            Ok(id) => AutosaveOutcome::Saved(id),
            Err(e) => {
                warn!(error = %e, "Autosave dropped");
                AutosaveOutcome::Failed
            },
        }
    }

    /// Snapshot the composer into the history, reporting storage failures
    ///
    /// # Returns
    /// `None` when the composer has no content
    #[instrument(skip(self, composer))]
    pub async fn save_now(&self, composer: &Composer) -> Result<Option<DraftId>, ApplicationError> {
        match ComposerDraft::capture(composer) {
            Some(draft) => self.store(draft).await.map(Some),
            None => Ok(None),
        }
    }

    /// List the stored drafts, newest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ComposerDraft>, ApplicationError> {
        self.load_or_empty().await
    }

    /// Get a single draft
    #[instrument(skip(self), fields(draft_id = %id))]
    pub async fn get(&self, id: DraftId) -> Result<ComposerDraft, ApplicationError> {
        self.load_or_empty()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| DomainError::not_found("Draft", id).into())
    }

    /// Open a draft for editing
    ///
    /// Media cannot be restored. A draft with media is only rebuilt once
    /// the caller confirms the loss.
    #[instrument(skip(self), fields(draft_id = %id))]
    pub async fn open(
        &self,
        id: DraftId,
        confirm_media_loss: bool,
    ) -> Result<DraftRestore, ApplicationError> {
        let draft = self.get(id).await?;
        let media_count = draft.media_count();

        if media_count > 0 && !confirm_media_loss {
            debug!(media_count, "Draft restore needs confirmation");
            return Ok(DraftRestore::NeedsConfirmation { media_count });
        }

        info!(blocks = draft.blocks.len(), dropped_media = media_count, "Draft restored");
        Ok(DraftRestore::Restored(RestoredDraft {
            draft_id: draft.id,
            blocks: draft.restore_blocks(),
            reply_policy: draft.reply_policy,
            sentiment: draft.sentiment,
            dropped_media: media_count,
        }))
    }

    /// Delete a draft
    ///
    /// Deletion from the history is not available yet.
    #[instrument(skip(self), fields(draft_id = %id))]
    pub async fn delete(&self, id: DraftId) -> Result<(), ApplicationError> {
        Err(ApplicationError::NotSupported(format!("deleting draft {id}")))
    }

    async fn store(&self, draft: ComposerDraft) -> Result<DraftId, ApplicationError> {
        let id = draft.id;
        let _guard = self.write_lock.lock().await;
        let mut drafts = self.load_or_empty().await?;
        drafts.insert(0, draft);
        drafts.truncate(self.max_drafts);

        self.storage.save_drafts(&drafts).await?;
        info!(draft_id = %id, stored = drafts.len(), "Draft saved");
        Ok(id)
    }

    /// Load the history; an undecodable list counts as empty
    async fn load_or_empty(&self) -> Result<Vec<ComposerDraft>, ApplicationError> {
        match self.storage.load_drafts().await {
            Ok(drafts) => Ok(drafts),
            Err(ApplicationError::CorruptData(reason)) => {
                warn!(reason = %reason, "Stored drafts are unreadable, starting fresh");
                Ok(Vec::new())
            },
            Err(e) => Err(e),
        }
    }
}
