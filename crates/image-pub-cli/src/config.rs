//! Publisher configuration
//!
//! This module handles hierarchical configuration loading from multiple sources:
//! - Default configuration file
//! - Environment-specific configuration file
//! - Environment variables
//! - Command-line arguments (applied by the caller)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Publisher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Telegram settings
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Image directory settings
    #[serde(default)]
    pub images: ImagesConfig,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram Bot API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Target channel (`@name` or numeric chat id)
    #[serde(default)]
    pub channel: String,

    /// Bot API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_url() -> String {
    image_pub_channel::DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    image_pub_channel::DEFAULT_TIMEOUT_SECS
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel: String::new(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("channel", &self.channel)
            .field("api_url", &self.api_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Image directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Directory holding candidate images
    #[serde(default = "default_images_path")]
    pub path: PathBuf,

    /// Remove registry rows when their published file is cleaned up
    #[serde(default)]
    pub prune_published_rows: bool,
}

fn default_images_path() -> PathBuf {
    PathBuf::from("images")
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            path: default_images_path(),
            prune_published_rows: false,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connect_timeout_seconds: u64,

    /// Run migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    /// Log every SQL statement
    #[serde(default)]
    pub log_statements: bool,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("t_image_pub.db")
}

fn default_max_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connection_timeout(),
            run_migrations: default_true(),
            log_statements: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting
    #[serde(default)]
    pub json_format: bool,

    /// Include target module
    #[serde(default = "default_true")]
    pub include_target: bool,

    /// Include thread IDs
    #[serde(default)]
    pub include_thread_ids: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            include_target: true,
            include_thread_ids: false,
        }
    }
}

impl PublisherConfig {
    /// Load configuration from files and environment
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default configuration file (config/default.toml)
    /// 2. Environment-specific file (config/{env}.toml)
    /// 3. Environment variables (IMAGE_PUB__SECTION__KEY)
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", environment))).required(false))
            // e.g., IMAGE_PUB__TELEGRAM__CHANNEL=@my_channel
            .add_source(
                Environment::with_prefix("IMAGE_PUB")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check that everything `--publish` needs is present
    pub fn validate_for_publish(&self) -> Result<(), String> {
        if self.telegram.token.trim().is_empty() {
            return Err("Telegram bot token is not configured (set TOKEN or --token)".to_string());
        }
        if self.telegram.channel.trim().is_empty() {
            return Err("Telegram channel is not configured (set CHANNEL or --channel)".to_string());
        }
        if self.telegram.timeout_seconds == 0 {
            return Err("telegram.timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}
