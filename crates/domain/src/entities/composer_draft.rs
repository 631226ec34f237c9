//! Autosaved composer draft
//!
//! Drafts keep text, code snippets and media *identifiers* only. Preview
//! references are local to a session, so a restored draft comes back without
//! its media.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{code_block::CodeBlock, composer::Composer, composer_block::ComposerBlock};
use crate::value_objects::{BlockId, DraftId, MediaId, ReplyPolicy, Sentiment};

/// Number of chars used for a draft's list preview
const PREVIEW_CHARS: usize = 80;

/// Snapshot of one block inside a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftBlock {
    pub id: BlockId,
    pub text: String,
    #[serde(default)]
    pub code_blocks: Vec<CodeBlock>,
    #[serde(default)]
    pub media_ids: Vec<MediaId>,
}

impl From<&ComposerBlock> for DraftBlock {
    fn from(block: &ComposerBlock) -> Self {
        Self {
            id: block.id(),
            text: block.text().to_string(),
            code_blocks: block.code_blocks().to_vec(),
            media_ids: block.media().iter().map(|m| m.id).collect(),
        }
    }
}

/// A persisted snapshot of the composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerDraft {
    pub id: DraftId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub blocks: Vec<DraftBlock>,
    #[serde(default)]
    pub reply_policy: ReplyPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl ComposerDraft {
    /// Snapshot the composer; `None` when there is nothing worth saving
    pub fn capture(composer: &Composer) -> Option<Self> {
        if !composer.has_content() {
            return None;
        }
        let now = Utc::now();
        Some(Self {
            id: DraftId::new(),
            created_at: now,
            updated_at: now,
            blocks: composer.blocks().iter().map(DraftBlock::from).collect(),
            reply_policy: composer.reply_policy(),
            sentiment: composer.sentiment(),
        })
    }

    /// Number of media items that will not come back on restore
    pub fn media_count(&self) -> usize {
        self.blocks.iter().map(|b| b.media_ids.len()).sum()
    }

    pub fn has_media(&self) -> bool {
        self.media_count() > 0
    }

    /// First chars of the first non-empty block, for draft lists
    pub fn preview(&self) -> String {
        let text = self
            .blocks
            .iter()
            .map(|b| b.text.trim())
            .find(|t| !t.is_empty())
            .unwrap_or_default();
        let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
        if text.chars().count() > PREVIEW_CHARS {
            preview.push('…');
        }
        preview
    }

    /// Rebuild composer blocks from the draft, without media
    pub fn restore_blocks(&self) -> Vec<ComposerBlock> {
        self.blocks
            .iter()
            .map(|b| ComposerBlock::from_parts(b.id, b.text.clone(), b.code_blocks.clone()))
            .collect()
    }
}
