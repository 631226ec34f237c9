//! Media Service - Turns selected files into attached media items
//!
//! Files are filtered by MIME type, given a local preview reference and
//! attached to a block up to its media ceiling. Previews for files that do
//! not end up attached are revoked right away.

use std::sync::Arc;

use domain::{
    BlockId, Composer, ComposerBlock, DomainError, MediaId, MediaItem, MediaKind, MediaTransform,
    SensitivityTag,
};
use tracing::{debug, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{MediaPreviewPort, SelectedFile},
};

/// Determine the media kind from a MIME type
///
/// Only `image/*` and `video/*` are accepted.
pub fn classify_media(mime_type: &str) -> Result<MediaKind, DomainError> {
    let unsupported = || DomainError::UnsupportedMediaType(mime_type.to_string());
    let parsed: mime::Mime = mime_type.trim().parse().map_err(|_| unsupported())?;

    if parsed.type_() == mime::IMAGE {
        Ok(MediaKind::Image)
    } else if parsed.type_() == mime::VIDEO {
        Ok(MediaKind::Video)
    } else {
        Err(unsupported())
    }
}

/// Result of attaching a batch of files to a block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachReport {
    /// Ids of the newly attached items, in selection order
    pub attached: Vec<MediaId>,
    /// Accepted files that did not fit under the media ceiling
    pub overflow: usize,
    /// Names of files that were rejected (wrong type or no preview)
    pub rejected: Vec<String>,
}

/// Service for the media pipeline
pub struct MediaService {
    previews: Arc<dyn MediaPreviewPort>,
}

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService").finish_non_exhaustive()
    }
}

impl MediaService {
    /// Create a new media service
    pub fn new(previews: Arc<dyn MediaPreviewPort>) -> Self {
        Self { previews }
    }

    /// Attach selected files to a block
    ///
    /// A block that is already full refuses the whole batch; otherwise only
    /// what fits is attached.
    #[instrument(skip(self, composer, files), fields(block = %block, files = files.len()))]
    pub fn attach(
        &self,
        composer: &mut Composer,
        block: BlockId,
        files: &[SelectedFile],
    ) -> Result<AttachReport, ApplicationError> {
        if composer.block(block).is_none() {
            return Err(DomainError::not_found("Block", block).into());
        }

        let mut report = AttachReport::default();
        let mut items = Vec::with_capacity(files.len());

        for file in files {
            let kind = match classify_media(&file.mime_type) {
                Ok(kind) => kind,
                Err(e) => {
                    warn!(file = %file.name, error = %e, "Skipping unsupported file");
                    report.rejected.push(file.name.clone());
                    continue;
                },
            };
            match self.previews.create_preview(file) {
                Ok(reference) => {
                    items.push(MediaItem::new(
                        reference,
                        file.name.clone(),
                        file.mime_type.clone(),
                        kind,
                    ));
                },
                Err(e) => {
                    warn!(file = %file.name, error = %e, "Could not create preview");
                    report.rejected.push(file.name.clone());
                },
            }
        }

        if items.is_empty() {
            return Ok(report);
        }

        let ids: Vec<MediaId> = items.iter().map(|m| m.id).collect();
        let sources: Vec<String> = items.iter().map(|m| m.source.clone()).collect();

        match composer.add_media(block, items) {
            Ok(overflow) => {
                for item in &overflow {
                    self.previews.revoke_preview(&item.source);
                }
                report.overflow = overflow.len();
                report.attached = ids
                    .into_iter()
                    .filter(|id| overflow.iter().all(|o| o.id != *id))
                    .collect();
                debug!(
                    attached = report.attached.len(),
                    overflow = report.overflow,
                    "Media attached"
                );
                Ok(report)
            },
            Err(e) => {
                for source in &sources {
                    self.previews.revoke_preview(source);
                }
                Err(e.into())
            },
        }
    }

    /// Detach a media item and release its preview
    #[instrument(skip(self, composer), fields(block = %block, media = %media_id))]
    pub fn remove(
        &self,
        composer: &mut Composer,
        block: BlockId,
        media_id: MediaId,
    ) -> Result<MediaItem, ApplicationError> {
        let item = composer.remove_media(block, media_id)?;
        self.previews.revoke_preview(&item.source);
        Ok(item)
    }

    /// Release the previews of every media item in the given blocks
    pub fn release(&self, blocks: &[ComposerBlock]) {
        let mut released = 0usize;
        for item in blocks.iter().flat_map(ComposerBlock::media) {
            self.previews.revoke_preview(&item.source);
            released += 1;
        }
        if released > 0 {
            debug!(released, "Media previews released");
        }
    }
}

/// An open media editor: the item being edited and its block
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEdit {
    block: BlockId,
    original: MediaItem,
}

impl MediaEdit {
    /// Start editing a media item
    pub fn open(composer: &Composer, block: BlockId, media_id: MediaId) -> Result<Self, DomainError> {
        let item = composer
            .block(block)
            .ok_or_else(|| DomainError::not_found("Block", block))?
            .media()
            .iter()
            .find(|m| m.id == media_id)
            .ok_or_else(|| DomainError::not_found("Media", media_id))?;

        Ok(Self {
            block,
            original: item.clone(),
        })
    }

    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// The item as it was when the editor opened
    pub const fn original(&self) -> &MediaItem {
        &self.original
    }

    /// Write the edits back in place of the original item
    pub fn save(
        self,
        composer: &mut Composer,
        transform: MediaTransform,
        alt: impl Into<String>,
        sensitivity: &[SensitivityTag],
    ) -> Result<MediaItem, DomainError> {
        let mut edited = self.original.with_transform(transform).with_alt(alt);
        edited.sensitivity.clear();
        let edited = sensitivity
            .iter()
            .fold(edited, |item, tag| item.with_sensitivity(*tag));

        composer.replace_media(self.block, edited.clone())?;
        debug!(media = %edited.id, "Media edit saved");
        Ok(edited)
    }
}
