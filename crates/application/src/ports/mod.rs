//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod draft_storage;
mod media_preview;
mod post_submission;

pub use draft_storage::DraftStoragePort;
#[cfg(test)]
pub use draft_storage::MockDraftStoragePort;
#[cfg(test)]
pub use media_preview::MockMediaPreviewPort;
pub use media_preview::{MediaPreviewPort, SelectedFile};
#[cfg(test)]
pub use post_submission::MockPostSubmissionPort;
pub use post_submission::{PostPayload, PostSubmissionPort};
