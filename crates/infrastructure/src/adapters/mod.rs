//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod object_url_registry;
mod outbox_post_gateway;

pub use object_url_registry::ObjectUrlRegistry;
pub use outbox_post_gateway::{OutboxPostGateway, OutboxRecord};
