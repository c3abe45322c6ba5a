//! Common test utilities and helpers
//!
//! `TestEnv` wires the real stack together: an in-memory registry, a temp
//! image directory and a `TelegramChannel` pointed at a wiremock server that
//! stands in for the Bot API.

#![allow(dead_code)]

use image_pub_channel::{TelegramChannel, TelegramConfig};
use image_pub_core::ImageStatus;
use image_pub_db::{create_pool, ImageRepository, PoolConfig, SqliteImageRepository, SqlitePool};
use image_pub_service::{ServiceRegistry, ServiceRegistryBuilder};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub use image_pub_integration_tests::{random_image_name, write_image, write_other};

pub const TOKEN: &str = "4242:integration-token";
pub const CHANNEL: &str = "@integration_channel";

/// Test environment
pub struct TestEnv {
    pub dir: TempDir,
    pub pool: SqlitePool,
    pub repository: Arc<SqliteImageRepository>,
    pub server: MockServer,
    pub services: ServiceRegistry,
}

impl TestEnv {
    /// Create a new environment with cleanup keeping registry rows
    pub async fn new() -> Self {
        Self::with_row_pruning(false).await
    }

    /// Create a new environment, optionally pruning rows on cleanup
    pub async fn with_row_pruning(prune_rows: bool) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir(dir.path().join("images")).expect("Failed to create images dir");

        let pool = create_pool(&PoolConfig::memory())
            .await
            .expect("Failed to create database pool");
        let repository = Arc::new(SqliteImageRepository::new(pool.clone()));

        let server = MockServer::start().await;
        let channel = TelegramChannel::new(
            TelegramConfig::new(TOKEN, CHANNEL)
                .with_api_url(server.uri())
                .with_timeout(Duration::from_secs(5)),
        )
        .expect("Failed to create Telegram client");

        let services = ServiceRegistryBuilder::new()
            .repository(repository.clone())
            .channel(Arc::new(channel))
            .prune_published_rows(prune_rows)
            .build()
            .expect("Failed to build services");

        Self {
            dir,
            pool,
            repository,
            server,
            services,
        }
    }

    /// Image directory
    pub fn images(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    /// Write an image into the image directory
    pub fn add_image(&self, name: &str) -> PathBuf {
        write_image(&self.images(), name)
    }

    /// Path of a name inside the image directory
    pub fn image_path(&self, name: &str) -> PathBuf {
        self.images().join(name)
    }

    /// Register a record directly and move it to `status`
    pub async fn seed(&self, name: &str, status: ImageStatus) {
        self.repository
            .insert(name)
            .await
            .expect("Failed to insert record");
        if status != ImageStatus::NotPublished {
            self.repository
                .update_status(name, status)
                .await
                .expect("Failed to update status");
        }
    }

    /// Current status of a record
    pub async fn status_of(&self, name: &str) -> Option<ImageStatus> {
        self.repository
            .find_by_name(name)
            .await
            .expect("Failed to query record")
            .map(|record| record.status)
    }

    /// Raw status code stored for a record
    pub async fn stored_code(&self, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT status FROM images WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to read status column")
    }

    /// Bot API accepts every photo
    pub async fn accept_all(&self) {
        Mock::given(method("POST"))
            .and(path(send_photo_path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": {"message_id": 100}})),
            )
            .with_priority(5)
            .mount(&self.server)
            .await;
    }

    /// Bot API refuses uploads whose body mentions `file_name`
    pub async fn reject(&self, file_name: &str) {
        Mock::given(method("POST"))
            .and(path(send_photo_path()))
            .and(body_string_contains(file_name))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: IMAGE_PROCESS_FAILED"
            })))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Bot API answers every call with `status` and a plain-text body
    pub async fn fail_with(&self, status: u16) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the fake Bot API received
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    /// Whether a file exists in the image directory
    pub fn exists(&self, name: &str) -> bool {
        self.image_path(name).exists()
    }
}

fn send_photo_path() -> String {
    format!("/bot{}/sendPhoto", TOKEN)
}
