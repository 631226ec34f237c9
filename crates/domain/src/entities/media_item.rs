//! Media attachment entity

use serde::{Deserialize, Serialize};

use crate::value_objects::{MediaId, MediaKind, MediaTransform, SensitivityTag};

/// An image or video attached to a composer block
///
/// `source` is a local preview reference (an object URL or similar); the
/// bytes themselves are uploaded by whoever receives the submitted post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Unique media identifier
    pub id: MediaId,
    /// Local preview reference
    pub source: String,
    /// Original file name as selected by the user
    pub file_name: String,
    /// MIME type reported for the file
    pub mime_type: String,
    /// Image or video
    pub kind: MediaKind,
    /// Crop/rotation applied in the media editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<MediaTransform>,
    /// Accessibility description
    #[serde(default)]
    pub alt: String,
    /// Content warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensitivity: Vec<SensitivityTag>,
}

impl MediaItem {
    /// Create a media item with a fresh id and no edits
    pub fn new(
        source: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        kind: MediaKind,
    ) -> Self {
        Self {
            id: MediaId::new(),
            source: source.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            kind,
            transform: None,
            alt: String::new(),
            sensitivity: Vec::new(),
        }
    }

    /// Set the alt text
    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    /// Set the transform; an identity transform clears it
    #[must_use]
    pub fn with_transform(mut self, transform: MediaTransform) -> Self {
        self.transform = (!transform.is_identity()).then_some(transform);
        self
    }

    /// Add a sensitivity tag (ignored if already present)
    #[must_use]
    pub fn with_sensitivity(mut self, tag: SensitivityTag) -> Self {
        if !self.sensitivity.contains(&tag) {
            self.sensitivity.push(tag);
        }
        self
    }

    /// Check if any content warning is set
    pub fn is_sensitive(&self) -> bool {
        !self.sensitivity.is_empty()
    }

    /// Check if the item has alt text
    pub fn has_alt(&self) -> bool {
        !self.alt.trim().is_empty()
    }
}
