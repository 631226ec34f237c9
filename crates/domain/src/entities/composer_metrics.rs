//! Character budget and derived composer flags

use serde::{Deserialize, Serialize};

/// Character accounting for one block against the per-block limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterBudget {
    /// Chars currently in the block
    pub length: usize,
    /// Per-block limit
    pub max: usize,
    /// `max - length`; negative when over the limit
    pub remaining: i64,
    /// Fraction of the limit used, clamped to `0.0..=1.0`
    pub ratio: f64,
    /// Within the near-limit threshold but not over
    pub is_near_limit: bool,
    /// Over the hard limit
    pub is_over_limit: bool,
}

impl CharacterBudget {
    /// Compute the budget for a text length
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub fn compute(length: usize, max: usize, near_limit_threshold: usize) -> Self {
        let remaining = max as i64 - length as i64;
        let ratio = if max == 0 {
            if length == 0 { 0.0 } else { 1.0 }
        } else {
            (length as f64 / max as f64).min(1.0)
        };
        Self {
            length,
            max,
            remaining,
            ratio,
            is_near_limit: remaining >= 0 && remaining <= near_limit_threshold as i64,
            is_over_limit: length > max,
        }
    }
}

/// Read-only quantities derived from the composer state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerMetrics {
    /// Fraction of the limit used by the active block
    pub char_ratio: f64,
    /// Chars left in the active block
    pub remaining_chars: i64,
    pub is_near_limit: bool,
    pub is_over_limit: bool,
    /// Every block within the hard limit and at least one with content
    pub can_post: bool,
    /// Another block fits under the block ceiling
    pub can_add_block: bool,
    pub block_count: usize,
}
