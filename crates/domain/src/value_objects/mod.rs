//! Value Objects - Immutable, identity-less domain primitives

mod block_id;
mod draft_id;
mod media_id;
mod media_transform;
mod reply_policy;

pub use block_id::BlockId;
pub use draft_id::DraftId;
pub use media_id::{CodeBlockId, MediaId};
pub use media_transform::{CropRect, MediaKind, MediaTransform, SensitivityTag};
pub use reply_policy::{ReplyPolicy, Sentiment};
