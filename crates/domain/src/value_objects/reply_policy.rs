//! Reply audience and sentiment selections carried with a post

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who may reply to the published post
///
/// Only stored and forwarded with the submission payload; the composer does
/// not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyPolicy {
    /// Anyone can reply
    #[default]
    Everyone,
    /// Accounts the author follows
    Following,
    /// Verified accounts
    Verified,
    /// Only accounts mentioned in the post
    Mentioned,
}

impl ReplyPolicy {
    /// All variants in menu order
    pub const ALL: [Self; 4] = [
        Self::Everyone,
        Self::Following,
        Self::Verified,
        Self::Mentioned,
    ];
}

impl fmt::Display for ReplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everyone => write!(f, "everyone"),
            Self::Following => write!(f, "following"),
            Self::Verified => write!(f, "verified"),
            Self::Mentioned => write!(f, "mentioned"),
        }
    }
}

impl std::str::FromStr for ReplyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "everyone" => Ok(Self::Everyone),
            "following" => Ok(Self::Following),
            "verified" => Ok(Self::Verified),
            "mentioned" => Ok(Self::Mentioned),
            _ => Err(format!(
                "Invalid reply policy: {s}. Use 'everyone', 'following', 'verified' or 'mentioned'"
            )),
        }
    }
}

/// Market sentiment tag attached to a trading post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Expecting the price to rise
    Bullish,
    /// Expecting the price to fall
    Bearish,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bullish" | "bull" => Ok(Self::Bullish),
            "bearish" | "bear" => Ok(Self::Bearish),
            _ => Err(format!("Invalid sentiment: {s}. Use 'bullish' or 'bearish'")),
        }
    }
}
