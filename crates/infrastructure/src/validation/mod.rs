//! Configuration validation module
//!
//! Checks the loaded configuration for values that would make the composer
//! misbehave and reports them at startup.

pub mod limits;

pub use limits::{ConfigValidator, ConfigWarning, WarningSeverity};
