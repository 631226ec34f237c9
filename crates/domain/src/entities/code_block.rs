//! Inline code snippet entity

use serde::{Deserialize, Serialize};

use crate::value_objects::CodeBlockId;

/// Language used when none is given
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

/// A code snippet rendered inline within a block's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    /// Unique snippet identifier
    pub id: CodeBlockId,
    /// Source code
    pub code: String,
    /// Syntax highlighting language, lowercase
    pub language: String,
    /// Char offset in the block text where the snippet renders
    #[serde(default)]
    pub anchor: usize,
}

impl CodeBlock {
    /// Create a snippet anchored at the given char offset
    pub fn new(code: impl Into<String>, language: &str, anchor: usize) -> Self {
        let language = language.trim().to_lowercase();
        Self {
            id: CodeBlockId::new(),
            code: code.into(),
            language: if language.is_empty() {
                DEFAULT_CODE_LANGUAGE.to_string()
            } else {
                language
            },
            anchor,
        }
    }

    /// Number of lines in the snippet
    pub fn line_count(&self) -> usize {
        self.code.lines().count().max(1)
    }
}
