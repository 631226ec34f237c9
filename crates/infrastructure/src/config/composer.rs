//! Composer limits configuration

use domain::{
    ComposerLimits, DEFAULT_MAX_BLOCKS, DEFAULT_MAX_CHARS_PER_BLOCK, DEFAULT_MAX_MEDIA_PER_BLOCK,
    DEFAULT_NEAR_LIMIT_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// Ceilings applied to every post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerAppConfig {
    /// Hard character limit per block (default: 280)
    #[serde(default = "default_max_chars_per_block")]
    pub max_chars_per_block: usize,

    /// Remaining chars at which the counter turns to a warning (default: 20)
    #[serde(default = "default_near_limit_threshold")]
    pub near_limit_threshold: usize,

    /// Maximum blocks in one post (default: 10)
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,

    /// Maximum media items per block (default: 4)
    #[serde(default = "default_max_media_per_block")]
    pub max_media_per_block: usize,
}

const fn default_max_chars_per_block() -> usize {
    DEFAULT_MAX_CHARS_PER_BLOCK
}

const fn default_near_limit_threshold() -> usize {
    DEFAULT_NEAR_LIMIT_THRESHOLD
}

const fn default_max_blocks() -> usize {
    DEFAULT_MAX_BLOCKS
}

const fn default_max_media_per_block() -> usize {
    DEFAULT_MAX_MEDIA_PER_BLOCK
}

impl Default for ComposerAppConfig {
    fn default() -> Self {
        Self {
            max_chars_per_block: default_max_chars_per_block(),
            near_limit_threshold: default_near_limit_threshold(),
            max_blocks: default_max_blocks(),
            max_media_per_block: default_max_media_per_block(),
        }
    }
}

impl ComposerAppConfig {
    /// Convert to the limits the composer aggregate enforces
    pub const fn to_limits(&self) -> ComposerLimits {
        ComposerLimits {
            max_chars_per_block: self.max_chars_per_block,
            near_limit_threshold: self.near_limit_threshold,
            max_blocks: self.max_blocks,
            max_media_per_block: self.max_media_per_block,
        }
    }
}
