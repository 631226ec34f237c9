//! Limit and storage checks for application configuration
//!
//! Critical issues make the composer unusable (e.g. a zero character limit)
//! and should stop startup; warnings describe degraded but working setups.

use std::fmt;

use crate::config::AppConfig;

/// Severity level for configuration warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Informational - no action required
    Info,
    /// Warning - works, but probably not as intended
    Warning,
    /// Critical - the composer cannot work with this value
    Critical,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A configuration warning with severity and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Severity level of the warning
    pub severity: WarningSeverity,
    /// Short code identifying the warning type
    pub code: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Recommended action to resolve the issue
    pub recommendation: String,
}

impl ConfigWarning {
    /// Create a new configuration warning
    #[must_use]
    pub fn new(
        severity: WarningSeverity,
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Check if this warning is critical
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, WarningSeverity::Critical)
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} - {}",
            self.severity, self.code, self.message, self.recommendation
        )
    }
}

/// Validates application configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and return all warnings
    ///
    /// Returns a list of warnings sorted by severity (critical first).
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        Self::check_composer_limits(config, &mut warnings);
        Self::check_drafts(config, &mut warnings);
        Self::check_submission(config, &mut warnings);

        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));

        warnings
    }

    /// Check if startup should be refused
    #[must_use]
    pub fn should_block_startup(warnings: &[ConfigWarning]) -> bool {
        warnings.iter().any(ConfigWarning::is_critical)
    }

    /// Log all warnings using tracing
    pub fn log_warnings(warnings: &[ConfigWarning]) {
        for warning in warnings {
            match warning.severity {
                WarningSeverity::Critical => {
                    tracing::error!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Configuration issue"
                    );
                },
                WarningSeverity::Warning => {
                    tracing::warn!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Configuration warning"
                    );
                },
                WarningSeverity::Info => {
                    tracing::info!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Configuration notice"
                    );
                },
            }
        }
    }

    fn check_composer_limits(config: &AppConfig, warnings: &mut Vec<ConfigWarning>) {
        let composer = &config.composer;

        if composer.max_chars_per_block == 0 {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Critical,
                "CFG001",
                "Character limit per block is zero; nothing can be posted",
                "Set composer.max_chars_per_block to a positive value (default 280)",
            ));
        } else if composer.near_limit_threshold >= composer.max_chars_per_block {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Warning,
                "CFG002",
                "Near-limit threshold is not below the character limit",
                "Lower composer.near_limit_threshold so the warning only shows close to the limit",
            ));
        }

        if composer.max_blocks == 0 {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Critical,
                "CFG003",
                "Block ceiling is zero; the composer cannot hold a block",
                "Set composer.max_blocks to at least 1",
            ));
        }

        if composer.max_media_per_block == 0 {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Info,
                "CFG004",
                "Media attachments are disabled",
                "Set composer.max_media_per_block above zero to allow media",
            ));
        }
    }

    fn check_drafts(config: &AppConfig, warnings: &mut Vec<ConfigWarning>) {
        let drafts = &config.drafts;

        if drafts.storage_key.trim().is_empty() {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Critical,
                "CFG005",
                "Draft storage key is empty",
                "Set drafts.storage_key (default \"composer-drafts\")",
            ));
        }

        if drafts.max_drafts == 0 {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Warning,
                "CFG006",
                "Draft history size is zero; autosave keeps nothing",
                "Set drafts.max_drafts to a positive value (default 20)",
            ));
        }

        if drafts.autosave_interval_secs == 0 {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Warning,
                "CFG007",
                "Autosave interval is zero; the minimum of one second is used",
                "Set drafts.autosave_interval_secs (default 10)",
            ));
        }

        if drafts.quota_bytes == Some(0) {
            warnings.push(ConfigWarning::new(
                WarningSeverity::Warning,
                "CFG008",
                "Storage quota is zero; every draft write will fail",
                "Remove drafts.quota_bytes or raise it",
            ));
        }
    }

    fn check_submission(config: &AppConfig, warnings: &mut Vec<ConfigWarning>) {
        if config.submission.timeout_secs == 0 {
            let severity = if config.is_production() {
                WarningSeverity::Critical
            } else {
                WarningSeverity::Warning
            };
            warnings.push(ConfigWarning::new(
                severity,
                "CFG009",
                "Submission timeout is zero; every post will stall",
                "Set submission.timeout_secs to a positive value (default 30)",
            ));
        }
    }
}
