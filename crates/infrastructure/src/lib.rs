//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: local storage for
//! drafts, preview references for media and the outbox submission gateway.
//! Also carries configuration, logging setup and the autosave task.

pub mod adapters;
pub mod autosave;
pub mod config;
pub mod persistence;
pub mod telemetry;
pub mod validation;

pub use adapters::*;
pub use autosave::{DEFAULT_AUTOSAVE_INTERVAL, spawn_autosave_task};
pub use config::{
    AppConfig, ComposerAppConfig, DraftsAppConfig, Environment, SubmissionAppConfig,
};
pub use persistence::{
    InMemoryDraftStore, LocalKeyValueStore, LocalStorageDraftStore, StorageError,
};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
pub use validation::{ConfigValidator, ConfigWarning, WarningSeverity};
