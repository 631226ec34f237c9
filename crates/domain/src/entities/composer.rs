//! Composer aggregate - the canonical block collection of a post being written
//!
//! All operations are synchronous. Id-keyed operations report a missing
//! block, media item or code snippet as [`DomainError::NotFound`]; refused
//! constraint operations leave the state untouched.

use serde::{Deserialize, Serialize};

use super::{
    composer_block::ComposerBlock,
    composer_metrics::{CharacterBudget, ComposerMetrics},
    media_item::MediaItem,
};
use crate::{
    errors::DomainError,
    value_objects::{BlockId, CodeBlockId, MediaId, ReplyPolicy, Sentiment},
};

/// Default per-block character limit
pub const DEFAULT_MAX_CHARS_PER_BLOCK: usize = 280;
/// Default distance from the limit at which a block counts as near it
pub const DEFAULT_NEAR_LIMIT_THRESHOLD: usize = 20;
/// Default maximum number of blocks in one post
pub const DEFAULT_MAX_BLOCKS: usize = 10;
/// Default maximum number of media items per block
pub const DEFAULT_MAX_MEDIA_PER_BLOCK: usize = 4;

/// Ceilings the composer enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerLimits {
    pub max_chars_per_block: usize,
    pub near_limit_threshold: usize,
    pub max_blocks: usize,
    pub max_media_per_block: usize,
}

impl Default for ComposerLimits {
    fn default() -> Self {
        Self {
            max_chars_per_block: DEFAULT_MAX_CHARS_PER_BLOCK,
            near_limit_threshold: DEFAULT_NEAR_LIMIT_THRESHOLD,
            max_blocks: DEFAULT_MAX_BLOCKS,
            max_media_per_block: DEFAULT_MAX_MEDIA_PER_BLOCK,
        }
    }
}

/// The block collection plus post-wide selections
#[derive(Debug, Clone, PartialEq)]
pub struct Composer {
    limits: ComposerLimits,
    blocks: Vec<ComposerBlock>,
    active_block: Option<BlockId>,
    reply_policy: ReplyPolicy,
    sentiment: Option<Sentiment>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(ComposerLimits::default())
    }
}

impl Composer {
    /// Create a composer holding a single empty block
    pub fn new(limits: ComposerLimits) -> Self {
        Self {
            limits,
            blocks: vec![ComposerBlock::new()],
            active_block: None,
            reply_policy: ReplyPolicy::default(),
            sentiment: None,
        }
    }

    pub const fn limits(&self) -> &ComposerLimits {
        &self.limits
    }

    pub fn blocks(&self) -> &[ComposerBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&ComposerBlock> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub const fn reply_policy(&self) -> ReplyPolicy {
        self.reply_policy
    }

    pub const fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }

    /// The explicitly active block, if it still exists
    pub fn active_block(&self) -> Option<BlockId> {
        self.active_block.filter(|id| self.block(*id).is_some())
    }

    /// Replace the whole state, e.g. when restoring a draft
    ///
    /// Only the structural shape is taken; the caller is trusted.
    pub fn initialize(
        &mut self,
        blocks: Vec<ComposerBlock>,
        reply_policy: ReplyPolicy,
        sentiment: Option<Sentiment>,
    ) {
        self.blocks = blocks;
        self.active_block = None;
        self.reply_policy = reply_policy;
        self.sentiment = sentiment;
    }

    /// Block that should receive the next UI action
    ///
    /// The active block if set, otherwise the first block. An empty
    /// collection gets a fresh first block; `None` only when the block
    /// ceiling forbids creating one.
    pub fn ensure_active_block(&mut self) -> Option<BlockId> {
        if self.blocks.is_empty() {
            if self.limits.max_blocks == 0 {
                return None;
            }
            self.blocks.push(ComposerBlock::new());
        }
        self.active_block()
            .or_else(|| self.blocks.first().map(ComposerBlock::id))
    }

    /// Mark a block as active
    pub fn set_active_block(&mut self, id: BlockId) -> Result<(), DomainError> {
        self.index_of(id)?;
        self.active_block = Some(id);
        Ok(())
    }

    /// Fall back to the default (first) block
    pub fn clear_active_block(&mut self) {
        self.active_block = None;
    }

    pub fn set_reply_policy(&mut self, policy: ReplyPolicy) {
        self.reply_policy = policy;
    }

    pub fn set_sentiment(&mut self, sentiment: Option<Sentiment>) {
        self.sentiment = sentiment;
    }

    /// Overwrite one block's text; never truncates at the character limit
    pub fn update_block_text(
        &mut self,
        id: BlockId,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.block_mut(id)?.set_text(text);
        Ok(())
    }

    /// Move a block's insertion point
    pub fn set_cursor(&mut self, id: BlockId, offset: usize) -> Result<(), DomainError> {
        self.block_mut(id)?.set_cursor(offset);
        Ok(())
    }

    /// Attach media to a block, up to the per-block ceiling
    ///
    /// Returns the items that did not fit. A block that is already full
    /// refuses with [`DomainError::MediaLimitReached`].
    pub fn add_media(
        &mut self,
        id: BlockId,
        items: Vec<MediaItem>,
    ) -> Result<Vec<MediaItem>, DomainError> {
        let max = self.limits.max_media_per_block;
        self.block_mut(id)?.attach_media(items, max)
    }

    pub fn remove_media(&mut self, id: BlockId, media_id: MediaId) -> Result<MediaItem, DomainError> {
        self.block_mut(id)?.remove_media(media_id)
    }

    /// Replace a media item in place (matched by id); returns the old item
    pub fn replace_media(&mut self, id: BlockId, item: MediaItem) -> Result<MediaItem, DomainError> {
        self.block_mut(id)?.replace_media(item)
    }

    /// Move the media item at `from` to position `to`
    pub fn reorder_media(&mut self, id: BlockId, from: usize, to: usize) -> Result<(), DomainError> {
        self.block_mut(id)?.reorder_media(from, to)
    }

    /// Remove a block; the last remaining block cannot be removed
    pub fn delete_block(&mut self, id: BlockId) -> Result<ComposerBlock, DomainError> {
        let index = self.index_of(id)?;
        if self.blocks.len() <= 1 {
            return Err(DomainError::LastBlock);
        }
        if self.active_block == Some(id) {
            self.active_block = None;
        }
        Ok(self.blocks.remove(index))
    }

    /// Append an empty block
    pub fn add_block(&mut self) -> Result<BlockId, DomainError> {
        if !self.can_add_block() {
            return Err(DomainError::BlockLimitReached {
                max: self.limits.max_blocks,
            });
        }
        let block = ComposerBlock::new();
        let id = block.id();
        self.blocks.push(block);
        Ok(id)
    }

    /// Insert an emoji at the block's insertion point
    pub fn insert_emoji(&mut self, id: BlockId, emoji: &str) -> Result<(), DomainError> {
        self.block_mut(id)?.insert_at_cursor(emoji);
        Ok(())
    }

    /// Anchor a code snippet at the block's insertion point
    pub fn insert_code_block(
        &mut self,
        id: BlockId,
        code: impl Into<String>,
        language: &str,
    ) -> Result<CodeBlockId, DomainError> {
        Ok(self.block_mut(id)?.insert_code_block(code, language))
    }

    pub fn remove_code_block(
        &mut self,
        id: BlockId,
        code_block_id: CodeBlockId,
    ) -> Result<(), DomainError> {
        self.block_mut(id)?.remove_code_block(code_block_id)?;
        Ok(())
    }

    /// Back to a single empty block with default selections
    pub fn reset(&mut self) {
        self.blocks = vec![ComposerBlock::new()];
        self.active_block = None;
        self.reply_policy = ReplyPolicy::default();
        self.sentiment = None;
    }

    /// Whether any block has text, media or code
    pub fn has_content(&self) -> bool {
        self.blocks.iter().any(ComposerBlock::has_content)
    }

    pub fn can_add_block(&self) -> bool {
        self.blocks.len() < self.limits.max_blocks
    }

    /// Every block within the hard limit and at least one with content
    pub fn can_post(&self) -> bool {
        let max = self.limits.max_chars_per_block;
        self.has_content() && self.blocks.iter().all(|b| b.char_count() <= max)
    }

    /// Character budget of one block
    pub fn block_budget(&self, id: BlockId) -> Result<CharacterBudget, DomainError> {
        let block = self.block(id).ok_or_else(|| DomainError::not_found("Block", id))?;
        Ok(self.budget_for(block))
    }

    /// Derived values for the active (or first) block and the whole post
    pub fn metrics(&self) -> ComposerMetrics {
        let active = self
            .active_block()
            .and_then(|id| self.block(id))
            .or_else(|| self.blocks.first());
        let budget = active.map_or_else(
            || {
                CharacterBudget::compute(
                    0,
                    self.limits.max_chars_per_block,
                    self.limits.near_limit_threshold,
                )
            },
            |b| self.budget_for(b),
        );

        ComposerMetrics {
            char_ratio: budget.ratio,
            remaining_chars: budget.remaining,
            is_near_limit: budget.is_near_limit,
            is_over_limit: budget.is_over_limit,
            can_post: self.can_post(),
            can_add_block: self.can_add_block(),
            block_count: self.blocks.len(),
        }
    }

    fn budget_for(&self, block: &ComposerBlock) -> CharacterBudget {
        CharacterBudget::compute(
            block.char_count(),
            self.limits.max_chars_per_block,
            self.limits.near_limit_threshold,
        )
    }

    fn index_of(&self, id: BlockId) -> Result<usize, DomainError> {
        self.blocks
            .iter()
            .position(|b| b.id() == id)
            .ok_or_else(|| DomainError::not_found("Block", id))
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut ComposerBlock, DomainError> {
        let index = self.index_of(id)?;
        Ok(&mut self.blocks[index])
    }
}
