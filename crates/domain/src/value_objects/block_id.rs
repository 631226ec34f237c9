//! Composer block identifier

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one block of a multi-block post for the block's whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Create a new random block ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a block ID from an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a block ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BlockId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
