//! Application layer - Use cases and orchestration
//!
//! Contains the media pipeline, draft persistence and the composer session
//! that drives the domain aggregate, plus the port definitions that
//! infrastructure adapters implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
