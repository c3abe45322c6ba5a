//! Database layer for image-pub
//!
//! This crate owns the image registry table. It provides:
//! - SQLite connection pool creation with embedded migrations
//! - The `ImageRepository` trait the services depend on
//! - `SqliteImageRepository`, the SQLx implementation of it
//! - Error handling that maps SQLx failures onto `DbError`
//!
//! # Example
//!
//! ```rust,no_run
//! use image_pub_db::{create_pool, ImageRepository, PoolConfig, SqliteImageRepository};
//! use image_pub_core::ImageStatus;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(&PoolConfig::from_path("t_image_pub.db")).await?;
//! let repo = SqliteImageRepository::new(pool);
//!
//! repo.insert("sunset.jpg").await?;
//! let pending = repo.find_by_status(ImageStatus::NotPublished, Some(1)).await?;
//! # Ok(())
//! # }
//! ```

// Re-export core domain types for convenience
pub use image_pub_core;

// Public modules
pub mod error;
pub mod pool;
pub mod repository;
pub mod sqlite;

// Re-exports for convenience
pub use error::{DbError, DbResult};
pub use pool::{
    close_pool, create_pool, run_migrations, verify_pool_health, DatabaseLocation, PoolConfig,
};
pub use repository::{ImageRepository, InsertOutcome};
pub use sqlite::SqliteImageRepository;

// Re-export sqlx types that users may need
pub use sqlx::sqlite::SqlitePool;

/// Database layer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
