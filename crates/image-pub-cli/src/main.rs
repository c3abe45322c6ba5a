//! image-pub
//!
//! Registers images found in a directory, publishes one pending image per
//! run to a Telegram channel, and deletes files that were already published.
//! Meant to be driven by a scheduler: `--add` and `--publish` on a timer,
//! `--clean` now and then.
//!
//! Exit status: 0 on success, 1 on a fatal error, 2 on a usage error,
//! 3 when `--publish` found nothing to publish.

mod config;
mod telemetry;

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser};
use image_pub_channel::{TelegramChannel, TelegramConfig};
use image_pub_core::ImageStatus;
use image_pub_db::{close_pool, create_pool, ImageRepository, PoolConfig, SqliteImageRepository, SqlitePool};
use image_pub_service::{PublishOutcome, ServiceRegistryBuilder};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::PublisherConfig;

/// Exit status when there was nothing to publish
const EXIT_NOTHING_TO_PUBLISH: u8 = 3;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("command").required(true).args(["add", "publish", "clean"])))]
struct Args {
    /// Register new images from the images directory
    #[arg(short, long)]
    add: bool,

    /// Publish the next pending image
    #[arg(short, long, visible_alias = "public")]
    publish: bool,

    /// Delete files of images that were already published
    #[arg(short, long)]
    clean: bool,

    /// Configuration directory
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Directory holding the images
    #[arg(long, env = "IMAGES_PATH")]
    images_path: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "DATABASE_NAME")]
    database: Option<PathBuf>,

    /// Telegram bot token
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Telegram channel (@name or chat id)
    #[arg(long, env = "CHANNEL")]
    channel: Option<String>,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

/// The one operation a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Add,
    Publish,
    Clean,
}

impl Args {
    fn selected(&self) -> Command {
        if self.add {
            Command::Add
        } else if self.publish {
            Command::Publish
        } else {
            Command::Clean
        }
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply_to(&self, config: &mut PublisherConfig) {
        if let Some(ref path) = self.images_path {
            config.images.path = path.clone();
        }
        if let Some(ref path) = self.database {
            config.database.path = path.clone();
        }
        if let Some(ref token) = self.token {
            config.telegram.token = token.clone();
        }
        if let Some(ref channel) = self.channel {
            config.telegram.channel = channel.clone();
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Done,
    NothingToPublish,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Done => ExitCode::SUCCESS,
            RunStatus::NothingToPublish => ExitCode::from(EXIT_NOTHING_TO_PUBLISH),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = PublisherConfig::load(&args.config_dir, &args.environment)
        .with_context(|| format!("Failed to load configuration from {}", args.config_dir.display()))?;
    args.apply_to(&mut config);

    telemetry::init_with_config((&config.logging).into());

    let command = args.selected();
    info!("Starting image-pub ({:?})", command);
    info!("Environment: {}", args.environment);
    info!("Images: {}", config.images.path.display());
    info!("Database: {}", config.database.path.display());

    match run(command, &config).await {
        Ok(status) => Ok(status.into()),
        Err(e) => {
            error!("{:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(command: Command, config: &PublisherConfig) -> Result<RunStatus> {
    if command == Command::Publish {
        config.validate_for_publish().map_err(|e| anyhow!(e))?;
    }

    let pool = setup_database(config).await?;
    let result = execute(command, config, pool.clone()).await;

    if let Err(e) = log_status_summary(&SqliteImageRepository::new(pool.clone())).await {
        warn!("Failed to read registry summary: {}", e);
    }
    close_pool(pool).await;

    result
}

async fn execute(command: Command, config: &PublisherConfig, pool: SqlitePool) -> Result<RunStatus> {
    let repository: Arc<dyn ImageRepository> = Arc::new(SqliteImageRepository::new(pool));
    let mut builder = ServiceRegistryBuilder::new()
        .repository(repository)
        .prune_published_rows(config.images.prune_published_rows);

    if command == Command::Publish {
        let telegram = TelegramConfig::new(&config.telegram.token, &config.telegram.channel)
            .with_api_url(&config.telegram.api_url)
            .with_timeout(Duration::from_secs(config.telegram.timeout_seconds));
        let channel = TelegramChannel::new(telegram).context("Failed to create Telegram client")?;
        builder = builder.channel(Arc::new(channel));
    }

    let services = builder.build()?;
    let directory = config.images.path.as_path();

    match command {
        Command::Add => {
            let report = services
                .discovery()
                .scan(directory)
                .await
                .with_context(|| format!("Failed to scan {}", directory.display()))?;
            info!("Added {} new images", report.count());
            let json = serde_json::to_string(&report)?;
            info!(report = %json, "Scan report");
            Ok(RunStatus::Done)
        }
        Command::Publish => {
            let report = services
                .publication()?
                .publish_next(directory)
                .await
                .context("Publishing failed")?;
            let json = serde_json::to_string(&report)?;
            info!(report = %json, "Publish report");

            match report.outcome {
                PublishOutcome::Published(_) => Ok(RunStatus::Done),
                PublishOutcome::NoPendingImages => Ok(RunStatus::NothingToPublish),
            }
        }
        Command::Clean => {
            let report = services
                .cleanup()
                .clean_published(directory)
                .await
                .context("Cleanup failed")?;
            info!("Deleted {} published images", report.count());
            let json = serde_json::to_string(&report)?;
            info!(report = %json, "Cleanup report");
            Ok(RunStatus::Done)
        }
    }
}

/// Open the registry database, creating the file and schema if needed
async fn setup_database(config: &PublisherConfig) -> Result<SqlitePool> {
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let pool_config = PoolConfig::from_path(&config.database.path)
        .max_connections(config.database.max_connections)
        .connect_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .run_migrations(config.database.run_migrations)
        .enable_logging(config.database.log_statements);

    let pool = create_pool(&pool_config)
        .await
        .context("Failed to open image registry")?;

    info!("Image registry ready");
    Ok(pool)
}

/// Log how many records sit in each status
async fn log_status_summary(repository: &dyn ImageRepository) -> Result<()> {
    let mut counts = Vec::with_capacity(ImageStatus::ALL.len());
    for status in ImageStatus::ALL {
        counts.push(format!("{}={}", status, repository.count_by_status(status).await?));
    }
    info!("Registry status: {}", counts.join(" "));
    Ok(())
}
