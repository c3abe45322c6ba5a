//! Telegram channel client
//!
//! Delivers images with the Bot API `sendPhoto` method. Telegram answers
//! every call with a JSON envelope (`ok`, `description`, `error_code`,
//! `result`); a `400 Bad Request` about the payload means the photo itself
//! was refused.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::client::{ChannelClient, Delivery};
use crate::error::{ChannelError, ChannelResult};

/// Default Bot API base URL
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Bad Request descriptions that point at the bot setup rather than the photo
const SETUP_FAILURES: [&str; 3] = ["chat not found", "chat_id is empty", "not enough rights"];

/// Telegram client configuration
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot API token
    pub token: String,

    /// Target chat: `@channelname` or a numeric chat id
    pub channel: String,

    /// Bot API base URL
    pub api_url: String,

    /// Request timeout
    pub timeout: Duration,
}

impl TelegramConfig {
    /// Create new configuration
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            channel: channel.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ChannelResult<()> {
        if self.token.is_empty() {
            return Err(ChannelError::Configuration(
                "Bot token cannot be empty".to_string(),
            ));
        }

        if self.token.contains('/') || self.token.chars().any(char::is_whitespace) {
            return Err(ChannelError::Configuration(
                "Bot token contains invalid characters".to_string(),
            ));
        }

        if self.channel.trim().is_empty() {
            return Err(ChannelError::Configuration(
                "Channel cannot be empty".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ChannelError::Configuration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn method_url(&self, method: &str) -> ChannelResult<Url> {
        let base = self.api_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{}/bot{}/{}", base, self.token, method))?)
    }

    fn masked_method_url(&self, method: &str) -> String {
        format!("{}/bot***/{}", self.api_url.trim_end_matches('/'), method)
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("channel", &self.channel)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Telegram channel client
#[derive(Clone)]
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
    send_photo_url: Url,
}

impl TelegramChannel {
    /// Create a new Telegram channel client
    pub fn new(config: TelegramConfig) -> ChannelResult<Self> {
        config.validate()?;

        let send_photo_url = config.method_url("sendPhoto")?;
        let client = Client::builder().timeout(config.timeout).build()?;

        info!(
            "Telegram channel client ready: channel={}, endpoint={}",
            config.channel,
            config.masked_method_url("sendPhoto")
        );

        Ok(Self {
            client,
            config,
            send_photo_url,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }
}

#[async_trait]
impl ChannelClient for TelegramChannel {
    #[instrument(skip(self), fields(channel = %self.config.channel))]
    async fn send(&self, path: &Path) -> ChannelResult<Delivery> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ChannelError::FileMissing(path.to_path_buf()));
            }
            Err(e) => {
                return Err(ChannelError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        debug!("Uploading {} ({} bytes)", file_name, bytes.len());

        let photo = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime_type(&file_name))?;
        let form = Form::new()
            .text("chat_id", self.config.channel.clone())
            .part("photo", photo);

        let response = self
            .client
            .post(self.send_photo_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let err = ChannelError::from(e);
                error!("Failed to reach Telegram: {}", err);
                err
            })?;

        let status = response.status();
        let body = response.text().await?;

        interpret_response(status, &body)
    }

    fn destination(&self) -> String {
        format!("telegram:{}", self.config.channel)
    }
}

/// Map a `sendPhoto` answer onto the delivery contract
fn interpret_response(status: StatusCode, body: &str) -> ChannelResult<Delivery> {
    let envelope = serde_json::from_str::<ApiResponse>(body).ok();

    match envelope {
        Some(api) if api.ok && status.is_success() => Ok(Delivery {
            message_id: api.result.map(|message| message.message_id),
        }),
        Some(api) => {
            let code = api.error_code.unwrap_or_else(|| status.as_u16());
            let description = api
                .description
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

            if code == StatusCode::BAD_REQUEST.as_u16() && !is_setup_failure(&description) {
                Err(ChannelError::Rejected(description))
            } else {
                Err(ChannelError::Api { code, description })
            }
        }
        None if status == StatusCode::BAD_REQUEST => Err(ChannelError::Rejected(format!(
            "HTTP {}: {}",
            status,
            truncate(body)
        ))),
        None => Err(ChannelError::InvalidResponse(format!(
            "HTTP {}: {}",
            status,
            truncate(body)
        ))),
    }
}

fn is_setup_failure(description: &str) -> bool {
    let description = description.to_ascii_lowercase();
    SETUP_FAILURES
        .iter()
        .any(|marker| description.contains(marker))
}

fn mime_type(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
