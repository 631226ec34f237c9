//! Post submission configuration

use std::{path::PathBuf, time::Duration};

use application::DEFAULT_SUBMISSION_TIMEOUT;
use serde::{Deserialize, Serialize};

/// Settings for handing finished posts to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAppConfig {
    /// Seconds to wait for the gateway before the post counts as stalled
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// JSON-lines file the outbox gateway appends posts to
    #[serde(default = "default_outbox_path")]
    pub outbox_path: PathBuf,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_SUBMISSION_TIMEOUT.as_secs()
}

fn default_outbox_path() -> PathBuf {
    PathBuf::from("composer-outbox.jsonl")
}

impl Default for SubmissionAppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            outbox_path: default_outbox_path(),
        }
    }
}

impl SubmissionAppConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
