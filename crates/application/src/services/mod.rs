//! Application services - Use case implementations

mod composer_session;
mod draft_service;
mod media_service;

pub use composer_session::{
    ComposerPhase, ComposerSession, DEFAULT_SUBMISSION_TIMEOUT, PendingPost, Popover,
    SharedSession, SubmitOutcome, submit_shared,
};
pub use draft_service::{
    AutosaveOutcome, DEFAULT_MAX_DRAFTS, DraftRestore, DraftService, RestoredDraft,
};
pub use media_service::{AttachReport, MediaEdit, MediaService, classify_media};
