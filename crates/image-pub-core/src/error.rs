//! Error types for the image registry

use thiserror::Error;

use crate::types::ImageStatus;

/// Result type alias for registry domain operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Main error type for registry domain rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Image name cannot be used as a plain file name
    #[error("Invalid image name: {0:?}")]
    InvalidName(String),

    /// Unknown persisted status code
    #[error("Invalid status code: {0}")]
    InvalidStatus(i16),

    /// Status change that is not an edge of the lifecycle
    #[error("Invalid status transition for {name}: {from} -> {to}")]
    InvalidTransition {
        name: String,
        from: ImageStatus,
        to: ImageStatus,
    },
}
