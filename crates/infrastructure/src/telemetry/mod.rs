//! Logging infrastructure
//!
//! Installs a `tracing-subscriber` registry with an env-overridable filter
//! and a text or JSON formatter.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_telemetry};
