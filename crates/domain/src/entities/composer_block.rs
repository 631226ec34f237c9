//! A single block of a multi-block post
//!
//! Text is a plain string plus an explicit insertion point. Code snippets are
//! kept beside the text and anchored at char offsets, so the block can be
//! read back as an ordered sequence of text runs and code markers.

use serde::{Deserialize, Serialize};

use super::{code_block::CodeBlock, media_item::MediaItem};
use crate::{
    errors::DomainError,
    value_objects::{BlockId, CodeBlockId, MediaId},
};

/// One piece of a block in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A run of plain text
    Text(&'a str),
    /// An inline code snippet
    Code(&'a CodeBlock),
}

/// A composable post block: text, attached media and inline code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerBlock {
    id: BlockId,
    text: String,
    /// Insertion point as a char offset; `None` means end of text
    #[serde(skip)]
    cursor: Option<usize>,
    #[serde(default)]
    media: Vec<MediaItem>,
    #[serde(default)]
    code_blocks: Vec<CodeBlock>,
}

impl Default for ComposerBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposerBlock {
    /// Create an empty block with a fresh id
    pub fn new() -> Self {
        Self::with_id(BlockId::new())
    }

    /// Create an empty block with a known id
    pub fn with_id(id: BlockId) -> Self {
        Self {
            id,
            text: String::new(),
            cursor: None,
            media: Vec::new(),
            code_blocks: Vec::new(),
        }
    }

    /// Create a block holding the given text
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut block = Self::new();
        block.text = text.into();
        block
    }

    /// Rebuild a block from stored text and code snippets (no media)
    pub fn from_parts(id: BlockId, text: impl Into<String>, code_blocks: Vec<CodeBlock>) -> Self {
        let mut block = Self::with_id(id);
        block.text = text.into();
        block.code_blocks = code_blocks;
        block.clamp_anchors();
        block.sort_code_blocks();
        block
    }

    pub const fn id(&self) -> BlockId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    pub fn code_blocks(&self) -> &[CodeBlock] {
        &self.code_blocks
    }

    /// Length of the text in chars, as counted against the character limit
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Current insertion point as a char offset
    pub fn cursor(&self) -> usize {
        let len = self.char_count();
        self.cursor.map_or(len, |c| c.min(len))
    }

    /// Move the insertion point; offsets at or past the end track the end
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = (offset < self.char_count()).then_some(offset);
    }

    /// Whether the block has anything worth posting or saving
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.media.is_empty() || !self.code_blocks.is_empty()
    }

    /// Overwrite the text; the character limit is not enforced here
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let len = self.char_count();
        if self.cursor.is_some_and(|c| c >= len) {
            self.cursor = None;
        }
        self.clamp_anchors();
    }

    /// Insert text at the insertion point and move the point past it
    pub fn insert_at_cursor(&mut self, inserted: &str) {
        let at = self.cursor();
        let inserted_len = inserted.chars().count();
        let byte_at = byte_offset(&self.text, at);
        self.text.insert_str(byte_at, inserted);

        for code in &mut self.code_blocks {
            if code.anchor > at {
                code.anchor += inserted_len;
            }
        }
        if let Some(c) = self.cursor.as_mut() {
            *c += inserted_len;
        }
    }

    /// Anchor a new code snippet at the insertion point
    pub fn insert_code_block(&mut self, code: impl Into<String>, language: &str) -> CodeBlockId {
        let block = CodeBlock::new(code, language, self.cursor());
        let id = block.id;
        // after any snippet already anchored at the same offset
        let pos = self
            .code_blocks
            .iter()
            .position(|c| c.anchor > block.anchor)
            .unwrap_or(self.code_blocks.len());
        self.code_blocks.insert(pos, block);
        id
    }

    /// Remove a code snippet
    pub fn remove_code_block(&mut self, id: CodeBlockId) -> Result<CodeBlock, DomainError> {
        let pos = self
            .code_blocks
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("CodeBlock", id))?;
        Ok(self.code_blocks.remove(pos))
    }

    /// Append media up to `max` items; returns the items that did not fit
    pub(crate) fn attach_media(
        &mut self,
        mut items: Vec<MediaItem>,
        max: usize,
    ) -> Result<Vec<MediaItem>, DomainError> {
        let capacity = max.saturating_sub(self.media.len());
        if capacity == 0 {
            return Err(DomainError::MediaLimitReached { max });
        }
        let overflow = if items.len() > capacity {
            items.split_off(capacity)
        } else {
            Vec::new()
        };
        self.media.extend(items);
        Ok(overflow)
    }

    pub(crate) fn remove_media(&mut self, media_id: MediaId) -> Result<MediaItem, DomainError> {
        let pos = self.media_position(media_id)?;
        Ok(self.media.remove(pos))
    }

    pub(crate) fn replace_media(&mut self, item: MediaItem) -> Result<MediaItem, DomainError> {
        let pos = self.media_position(item.id)?;
        Ok(std::mem::replace(&mut self.media[pos], item))
    }

    pub(crate) fn reorder_media(&mut self, from: usize, to: usize) -> Result<(), DomainError> {
        let len = self.media.len();
        for index in [from, to] {
            if index >= len {
                return Err(DomainError::MediaIndexOutOfRange { index, len });
            }
        }
        let item = self.media.remove(from);
        self.media.insert(to, item);
        Ok(())
    }

    /// The block as text runs interleaved with code markers in anchor order
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.code_blocks.len() * 2 + 1);
        let mut consumed = 0;
        for code in &self.code_blocks {
            let end = byte_offset(&self.text, code.anchor);
            if end > consumed {
                segments.push(Segment::Text(&self.text[consumed..end]));
            }
            segments.push(Segment::Code(code));
            consumed = end.max(consumed);
        }
        if consumed < self.text.len() {
            segments.push(Segment::Text(&self.text[consumed..]));
        }
        segments
    }

    fn media_position(&self, media_id: MediaId) -> Result<usize, DomainError> {
        self.media
            .iter()
            .position(|m| m.id == media_id)
            .ok_or_else(|| DomainError::not_found("Media", media_id))
    }

    fn clamp_anchors(&mut self) {
        let len = self.char_count();
        for code in &mut self.code_blocks {
            code.anchor = code.anchor.min(len);
        }
    }

    fn sort_code_blocks(&mut self) {
        self.code_blocks.sort_by_key(|c| c.anchor);
    }
}

/// Byte index of a char offset, saturating at the end of the string
fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(i, _)| i)
}
