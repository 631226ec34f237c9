//! Media preview port
//!
//! Creates and revokes session-local preview references for selected files
//! (the analog of browser object URLs). References are only valid for the
//! lifetime of the process that created them.

#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// A file chosen through a file dialog or drag and drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the picker
    pub name: String,
    /// Declared MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl SelectedFile {
    /// Create a selected file description
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

/// Port for local media preview references
#[cfg_attr(test, automock)]
pub trait MediaPreviewPort: Send + Sync {
    /// Create a preview reference for a file
    fn create_preview(&self, file: &SelectedFile) -> Result<String, ApplicationError>;

    /// Release a preview reference; unknown references are ignored
    fn revoke_preview(&self, reference: &str);
}
