//! Domain entities - Objects with identity and lifecycle

mod code_block;
mod composer;
mod composer_block;
mod composer_draft;
mod composer_metrics;
mod media_item;

pub use code_block::{CodeBlock, DEFAULT_CODE_LANGUAGE};
pub use composer::{
    Composer, ComposerLimits, DEFAULT_MAX_BLOCKS, DEFAULT_MAX_CHARS_PER_BLOCK,
    DEFAULT_MAX_MEDIA_PER_BLOCK, DEFAULT_NEAR_LIMIT_THRESHOLD,
};
pub use composer_block::{ComposerBlock, Segment};
pub use composer_draft::{ComposerDraft, DraftBlock};
pub use composer_metrics::{CharacterBudget, ComposerMetrics};
pub use media_item::MediaItem;
