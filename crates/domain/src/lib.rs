//! Domain layer for the post composer
//!
//! Contains the block collection, its constraints, media and draft entities,
//! value objects, and domain errors. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
