//! Service-layer error types
//!
//! This module maps registry, database and channel errors onto the errors
//! a workflow reports to its caller. Everything that reaches this type is
//! fatal for the invocation; per-image outcomes never leave the services.

use image_pub_channel::ChannelError;
use image_pub_core::RegistryError;
use image_pub_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A registry record vanished while being processed
    #[error("Image not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Status change outside the lifecycle
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Fatal channel failure (transport, authentication, configuration)
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem error
    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// Internal service error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Build an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ServiceError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// Check if this error came from the channel
    pub fn is_channel(&self) -> bool {
        matches!(self, ServiceError::Channel(_))
    }
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidName(_) => ServiceError::InvalidInput(err.to_string()),
            RegistryError::InvalidTransition { .. } => {
                ServiceError::InvalidTransition(err.to_string())
            }
            RegistryError::InvalidStatus(_) => ServiceError::Database(err.to_string()),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::Domain(err) => ServiceError::from(err),
            DbError::InvalidData(msg) => ServiceError::InvalidInput(msg),
            DbError::Configuration(msg) | DbError::Internal(msg) => ServiceError::Internal(msg),
            DbError::Connection(msg)
            | DbError::Pool(msg)
            | DbError::Query(msg)
            | DbError::Migration(msg) => ServiceError::Database(msg),
        }
    }
}
