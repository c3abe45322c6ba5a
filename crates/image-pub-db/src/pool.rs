//! Database connection pool management
//!
//! This module creates the SQLite pool backing the image registry, applies
//! the embedded migrations and checks the connection is usable.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Default maximum number of connections in the pool.
///
/// The registry is used by a single run-to-completion process, one
/// connection is enough.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 1;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// URL of a private in-memory database
pub const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Where the registry database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// SQLx connection URL (e.g., sqlite::memory:)
    Url(String),

    /// Database file, used as-is and never parsed as a URL
    File(PathBuf),
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseLocation::Url(url) => f.write_str(url),
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Configuration for database connection pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Database URL or file
    pub location: DatabaseLocation,

    /// Maximum number of connections allowed in the pool
    pub max_connections: u32,

    /// Timeout for acquiring a connection
    pub connect_timeout: Duration,

    /// Whether to enable SQL statement logging
    pub enable_logging: bool,

    /// Whether to run migrations on startup
    pub run_migrations: bool,
}

impl PoolConfig {
    /// Create a new pool configuration with sensible defaults
    pub fn new(database_url: impl Into<String>) -> Self {
        Self::with_location(DatabaseLocation::Url(database_url.into()))
    }

    /// Configuration for a database file, created if missing
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::with_location(DatabaseLocation::File(path.as_ref().to_path_buf()))
    }

    fn with_location(location: DatabaseLocation) -> Self {
        Self {
            location,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            enable_logging: false,
            run_migrations: true,
        }
    }

    /// Configuration for an in-memory database (for testing).
    ///
    /// Every connection to `sqlite::memory:` opens its own database, so the
    /// pool is pinned to a single connection.
    pub fn memory() -> Self {
        Self::new(MEMORY_DATABASE_URL).max_connections(1)
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable SQL logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable automatic migrations
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Whether this configuration points at an in-memory database
    pub fn is_memory(&self) -> bool {
        match &self.location {
            DatabaseLocation::Url(url) => url.contains(":memory:") || url.contains("mode=memory"),
            DatabaseLocation::File(_) => false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> DbResult<()> {
        let empty = match &self.location {
            DatabaseLocation::Url(url) => url.is_empty(),
            DatabaseLocation::File(path) => path.as_os_str().is_empty(),
        };
        if empty {
            return Err(DbError::Configuration(
                "Database location cannot be empty".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(DbError::Configuration(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.is_memory() && self.max_connections > 1 {
            return Err(DbError::Configuration(format!(
                "in-memory databases need max_connections = 1, got {}",
                self.max_connections
            )));
        }

        Ok(())
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            DatabaseLocation::Url(url) => SqliteConnectOptions::from_str(url)
                .map_err(|e| DbError::Configuration(format!("Invalid database URL: {}", e)))?,
            DatabaseLocation::File(path) => SqliteConnectOptions::new().filename(path),
        };
        Ok(options.create_if_missing(true))
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_path("t_image_pub.db")
    }
}

/// Create a SQLite connection pool from configuration
pub async fn create_pool(config: &PoolConfig) -> DbResult<SqlitePool> {
    config.validate()?;

    info!(
        "Creating database connection pool: max={}, database={}",
        config.max_connections, config.location
    );

    let mut connect_opts = config.connect_options()?;

    if !config.enable_logging {
        connect_opts = connect_opts.disable_statement_logging();
    }

    // Idle reaping would drop an in-memory database along with its connection
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(connect_opts)
        .await
        .map_err(|e| DbError::Connection(format!("Failed to create pool: {}", e)))?;

    info!("Database connection pool created successfully");

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    verify_pool_health(&pool).await?;

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| DbError::Migration(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Verify that the connection pool is healthy
pub async fn verify_pool_health(pool: &SqlitePool) -> DbResult<()> {
    debug!("Verifying database pool health");

    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| DbError::Connection(format!("Health check failed: {}", e)))?;

    debug!("Database pool health check passed");
    Ok(())
}

/// Gracefully close the connection pool
pub async fn close_pool(pool: SqlitePool) {
    info!("Closing database connection pool");
    pool.close().await;
    info!("Database connection pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageRepository, SqliteImageRepository};

    #[test]
    fn test_pool_config_validation() {
        let config = PoolConfig::from_path("/tmp/registry.db");
        assert!(config.validate().is_ok());

        let bad_config = PoolConfig::new("");
        assert!(bad_config.validate().is_err());

        let bad_config = PoolConfig::from_path("registry.db").max_connections(0);
        assert!(bad_config.validate().is_err());

        let bad_config = PoolConfig::memory().max_connections(4);
        assert!(bad_config.validate().is_err());
    }

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::from_path("data/registry.db")
            .max_connections(3)
            .connect_timeout(Duration::from_secs(5))
            .enable_logging(true)
            .run_migrations(false);

        assert_eq!(
            config.location,
            DatabaseLocation::File(PathBuf::from("data/registry.db"))
        );
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(config.enable_logging);
        assert!(!config.run_migrations);
        assert!(!config.is_memory());
        assert!(PoolConfig::memory().is_memory());
    }

    #[tokio::test]
    async fn test_memory_pool_runs_migrations() {
        let pool = create_pool(&PoolConfig::memory()).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'images'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 1);

        close_pool(pool).await;
    }

    #[tokio::test]
    async fn test_file_pool_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        let pool = create_pool(&PoolConfig::from_path(&path)).await.unwrap();
        verify_pool_health(&pool).await.unwrap();
        close_pool(pool).await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_path_is_not_parsed_as_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry?mode=ro.db");

        let pool = create_pool(&PoolConfig::from_path(&path)).await.unwrap();
        let repository = SqliteImageRepository::new(pool.clone());
        assert!(repository.insert("a.jpg").await.unwrap().is_created());
        close_pool(pool).await;

        assert!(path.exists());
        assert!(!dir.path().join("registry").exists());
    }
}
