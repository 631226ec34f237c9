//! Tracing subscriber initialization and configuration

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "application=debug,infrastructure=info")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,

    /// Include the event target (module path) in each line
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

const fn default_with_target() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
            with_target: default_with_target(),
        }
    }
}

impl TelemetryConfig {
    /// Same configuration with a different fallback filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

/// Initialize the global tracing subscriber
///
/// Fails if a subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{TelemetryConfig, init_telemetry};
///
/// init_telemetry(&TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    info!(json = config.json, "Telemetry initialized");
    Ok(())
}

/// Errors that can occur during telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The log filter could not be parsed
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_filter, "info");
        assert!(!config.json);
        assert!(config.with_target);
    }

    #[test]
    fn with_log_filter_overrides() {
        let config = TelemetryConfig::default().with_log_filter("debug");
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: TelemetryConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert!(config.json);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn error_messages() {
        let err = TelemetryError::Init("already set".into());
        assert_eq!(err.to_string(), "Failed to initialize tracing: already set");
    }
}
