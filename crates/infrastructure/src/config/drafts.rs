//! Draft persistence configuration

use std::{path::PathBuf, time::Duration};

use application::DEFAULT_MAX_DRAFTS;
use serde::{Deserialize, Serialize};

/// Storage key of the draft list, shared with the browser implementation
pub const DEFAULT_DRAFTS_KEY: &str = "composer-drafts";

/// Draft autosave and storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftsAppConfig {
    /// File backing the local key-value store
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Key under which the draft list is stored
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Drafts kept in the history (default: 20)
    #[serde(default = "default_max_drafts")]
    pub max_drafts: usize,

    /// Seconds between autosave ticks (default: 10)
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: u64,

    /// Optional byte quota for the whole store
    #[serde(default)]
    pub quota_bytes: Option<u64>,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("composer-storage.json")
}

fn default_storage_key() -> String {
    DEFAULT_DRAFTS_KEY.to_string()
}

const fn default_max_drafts() -> usize {
    DEFAULT_MAX_DRAFTS
}

const fn default_autosave_interval() -> u64 {
    10
}

impl Default for DraftsAppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            storage_key: default_storage_key(),
            max_drafts: default_max_drafts(),
            autosave_interval_secs: default_autosave_interval(),
            quota_bytes: None,
        }
    }
}

impl DraftsAppConfig {
    pub const fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }
}
