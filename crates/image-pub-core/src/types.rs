//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// Publication status of a registered image
///
/// Persisted as a small integer. The codes are bit values, so `NotValid`
/// is stored as 4 and 3 is never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Registered and waiting to be published
    NotPublished,
    /// Delivered to the channel
    Published,
    /// File was missing when publication was attempted
    NotFound,
    /// Channel rejected the file content
    NotValid,
}

impl ImageStatus {
    /// Every status, in code order
    pub const ALL: [ImageStatus; 4] = [
        ImageStatus::NotPublished,
        ImageStatus::Published,
        ImageStatus::NotFound,
        ImageStatus::NotValid,
    ];

    /// Storage code for this status
    pub fn code(self) -> i16 {
        match self {
            Self::NotPublished => 0,
            Self::Published => 1,
            Self::NotFound => 2,
            Self::NotValid => 4,
        }
    }

    /// Decode a storage code
    pub fn from_code(code: i16) -> Result<Self, RegistryError> {
        match code {
            0 => Ok(Self::NotPublished),
            1 => Ok(Self::Published),
            2 => Ok(Self::NotFound),
            4 => Ok(Self::NotValid),
            other => Err(RegistryError::InvalidStatus(other)),
        }
    }

    /// Whether no further transition is possible from this status
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::NotPublished)
    }

    /// Whether `next` is a lifecycle edge out of this status.
    ///
    /// Only a pending image may move, and only to one of the three
    /// terminal statuses.
    pub fn can_transition_to(self, next: ImageStatus) -> bool {
        self == Self::NotPublished && next.is_terminal()
    }
}

impl Default for ImageStatus {
    fn default() -> Self {
        Self::NotPublished
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPublished => write!(f, "not_published"),
            Self::Published => write!(f, "published"),
            Self::NotFound => write!(f, "not_found"),
            Self::NotValid => write!(f, "not_valid"),
        }
    }
}

impl FromStr for ImageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_published" => Ok(Self::NotPublished),
            "published" => Ok(Self::Published),
            "not_found" => Ok(Self::NotFound),
            "not_valid" => Ok(Self::NotValid),
            _ => Err(format!("Invalid image status: {}", s)),
        }
    }
}
