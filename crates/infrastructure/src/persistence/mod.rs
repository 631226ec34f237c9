//! Persistence module
//!
//! Local key-value storage and the draft stores built on it.

pub mod error;
pub mod in_memory_draft_store;
pub mod key_value_store;
pub mod local_storage_draft_store;

pub use error::{StorageError, map_storage_error};
pub use in_memory_draft_store::InMemoryDraftStore;
pub use key_value_store::LocalKeyValueStore;
pub use local_storage_draft_store::LocalStorageDraftStore;
