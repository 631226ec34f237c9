//! Post submission port
//!
//! The host supplies the gateway that actually publishes a post. The composer
//! only hands over an owned snapshot and waits for the outcome.

use async_trait::async_trait;
use domain::{ComposerBlock, ReplyPolicy, Sentiment};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Snapshot of a post at the moment it was submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    /// Blocks in display order
    pub blocks: Vec<ComposerBlock>,
    pub reply_policy: ReplyPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl PostPayload {
    /// Total number of attached media items
    pub fn media_count(&self) -> usize {
        self.blocks.iter().map(|b| b.media().len()).sum()
    }
}

/// Port for publishing a finished post
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PostSubmissionPort: Send + Sync {
    /// Publish the post
    ///
    /// # Arguments
    /// * `payload` - Ordered blocks plus post-wide selections
    async fn submit(&self, payload: &PostPayload) -> Result<(), ApplicationError>;
}
