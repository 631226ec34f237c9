//! Application configuration
//!
//! Split into focused sub-modules:
//! - `composer`: Character, block and media limits
//! - `drafts`: Draft storage and autosave
//! - `submission`: Gateway timeout and outbox location
//!
//! Telemetry settings live next to the subscriber setup in
//! [`crate::telemetry`].

mod composer;
mod drafts;
mod submission;

use std::fmt;

use application::DEFAULT_SUBMISSION_TIMEOUT;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use composer::ComposerAppConfig;
pub use drafts::{DEFAULT_DRAFTS_KEY, DraftsAppConfig};
pub use submission::SubmissionAppConfig;

use crate::{
    telemetry::TelemetryConfig,
    validation::{ConfigValidator, ConfigWarning},
};

/// Prefix for environment overrides, e.g. `COMPOSER__DRAFTS__MAX_DRAFTS`
pub const ENV_PREFIX: &str = "COMPOSER";

/// Default configuration file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "composer";

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - verbose defaults
    #[default]
    Development,
    /// Production environment
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// Composer limits
    #[serde(default)]
    pub composer: ComposerAppConfig,

    /// Draft storage and autosave
    #[serde(default)]
    pub drafts: DraftsAppConfig,

    /// Post submission
    #[serde(default)]
    pub submission: SubmissionAppConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `composer.{toml,json,yaml}` and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file (optional) and environment
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("drafts.storage_key", DEFAULT_DRAFTS_KEY)?
            .set_default("submission.timeout_secs", DEFAULT_SUBMISSION_TIMEOUT.as_secs())?
            // Load from file if exists
            .add_source(config::File::with_name(file).required(false))
            // Override with environment variables (e.g., COMPOSER__COMPOSER__MAX_BLOCKS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let app_config: Self = config.try_deserialize()?;
        debug!(file, environment = %app_config.environment, "Configuration loaded");
        Ok(app_config)
    }

    /// Check the configuration for values that make the composer unusable
    ///
    /// Returns warnings sorted by severity, most severe first.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        ConfigValidator::validate(self)
    }

    /// Whether this is a production environment
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
