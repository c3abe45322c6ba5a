//! Repository trait abstraction for the image registry
//!
//! This module defines the `ImageRepository` trait the services depend on,
//! so the storage behind it can be swapped (SQLite, in-memory, mocks).

use async_trait::async_trait;
use image_pub_core::{ImageRecord, ImageStatus};

use crate::error::DbResult;

/// Result of registering an image name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new pending record was stored
    Created,
    /// The name was already registered; nothing changed
    Duplicate,
}

impl InsertOutcome {
    /// Whether a new record was stored
    pub fn is_created(&self) -> bool {
        matches!(self, InsertOutcome::Created)
    }
}

/// Repository trait for image registry operations
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Register an image name with status `NotPublished`
    ///
    /// # Arguments
    /// * `name` - File base name including extension
    ///
    /// # Returns
    /// * `Ok(InsertOutcome::Created)` - A new record was stored
    /// * `Ok(InsertOutcome::Duplicate)` - The name already exists; this is not an error
    /// * `Err(DbError::Domain)` - If the name is not a bare file name
    async fn insert(&self, name: &str) -> DbResult<InsertOutcome>;

    /// Find a record by its name
    ///
    /// # Returns
    /// * `Ok(Some(ImageRecord))` - The record if found
    /// * `Ok(None)` - If no record has that name
    async fn find_by_name(&self, name: &str) -> DbResult<Option<ImageRecord>>;

    /// Find records with the given status, oldest registration first
    ///
    /// # Arguments
    /// * `status` - Status to match
    /// * `limit` - Maximum number of records, `None` for all of them
    async fn find_by_status(
        &self,
        status: ImageStatus,
        limit: Option<u32>,
    ) -> DbResult<Vec<ImageRecord>>;

    /// Persist a new status for a record
    ///
    /// # Returns
    /// * `Ok(ImageRecord)` - The updated record
    /// * `Err(DbError::NotFound)` - If no record has that name
    /// * `Err(DbError::Domain)` - If the change is not a lifecycle edge
    async fn update_status(&self, name: &str, status: ImageStatus) -> DbResult<ImageRecord>;

    /// Delete a record by name
    ///
    /// # Returns
    /// * `Err(DbError::NotFound)` - If no record has that name
    async fn delete(&self, name: &str) -> DbResult<()>;

    /// Count all records
    async fn count(&self) -> DbResult<i64>;

    /// Count records with the given status
    async fn count_by_status(&self, status: ImageStatus) -> DbResult<i64>;

    /// Health check - verify the registry is reachable
    async fn health_check(&self) -> DbResult<()>;
}
