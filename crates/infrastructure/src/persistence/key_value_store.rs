//! File-backed key-value store
//!
//! Emulates browser local storage: string keys and values, an optional byte
//! quota, and a whole-store rewrite on every change. The file is read once
//! on open; concurrent writers to the same file are not coordinated and the
//! last writer wins.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use tracing::{debug, instrument};

use super::error::StorageError;

/// Local key-value storage with optional persistence
#[derive(Debug)]
pub struct LocalKeyValueStore {
    path: Option<PathBuf>,
    quota_bytes: Option<u64>,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalKeyValueStore {
    /// Open a store backed by a JSON file, creating it lazily on first write
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(keys = items.len(), "Opened local storage");

        Ok(Self {
            path: Some(path),
            quota_bytes,
            items: Mutex::new(items),
        })
    }

    /// Create a store that lives only in memory
    pub fn in_memory(quota_bytes: Option<u64>) -> Self {
        Self {
            path: None,
            quota_bytes,
            items: Mutex::new(BTreeMap::new()),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    /// Store a value, enforcing the quota before anything is written
    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let value = value.into();
        let mut items = self.items.lock();

        let current = usage_of(&items);
        let replaced = items.get(key).map_or(0, |old| entry_size(key, old));
        let needed = current - replaced + entry_size(key, &value);
        if let Some(quota) = self.quota_bytes {
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        let previous = items.insert(key.to_string(), value);
        if let Err(e) = self.persist(&items) {
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Remove a value; returns whether it existed
    pub fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let mut items = self.items.lock();
        let Some(previous) = items.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&items) {
            items.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.lock().keys().cloned().collect()
    }

    /// Bytes used by all keys and values
    pub fn usage_bytes(&self) -> u64 {
        usage_of(&self.items.lock())
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), keys = items.len(), "Local storage written");
        Ok(())
    }
}

fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

fn usage_of(items: &BTreeMap<String, String>) -> u64 {
    items.iter().map(|(k, v)| entry_size(k, v)).sum()
}
