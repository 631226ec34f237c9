//! Object-URL preview registry
//!
//! Implements `MediaPreviewPort` by handing out `blob:` references that stay
//! valid until revoked, like browser object URLs. The registry remembers
//! which file each live reference points to.

use std::collections::HashMap;

use application::{
    error::ApplicationError,
    ports::{MediaPreviewPort, SelectedFile},
};
use parking_lot::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

/// Scheme prefix of every reference
const REFERENCE_PREFIX: &str = "blob:composer/";

/// Registry of live preview references
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    live: Mutex<HashMap<String, SelectedFile>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File behind a live reference
    pub fn resolve(&self, reference: &str) -> Option<SelectedFile> {
        self.live.lock().get(reference).cloned()
    }

    pub fn is_live(&self, reference: &str) -> bool {
        self.live.lock().contains_key(reference)
    }

    /// Number of references not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}

impl MediaPreviewPort for ObjectUrlRegistry {
    fn create_preview(&self, file: &SelectedFile) -> Result<String, ApplicationError> {
        if file.name.trim().is_empty() {
            return Err(ApplicationError::MediaPreview("file has no name".into()));
        }
        let reference = format!("{REFERENCE_PREFIX}{}", Uuid::new_v4());
        self.live.lock().insert(reference.clone(), file.clone());
        debug!(file = %file.name, reference = %reference, "Preview created");
        Ok(reference)
    }

    fn revoke_preview(&self, reference: &str) {
        if self.live.lock().remove(reference).is_some() {
            debug!(reference = %reference, "Preview revoked");
        } else {
            trace!(reference = %reference, "Revoke of unknown preview ignored");
        }
    }
}
