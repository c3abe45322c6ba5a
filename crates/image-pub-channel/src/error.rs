//! Channel error types
//!
//! Errors are split by what the publisher does with them: a missing file
//! and rejected content are per-image outcomes, everything else aborts the
//! invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Channel delivery errors
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The image file does not exist
    #[error("File not found: {}", .0.display())]
    FileMissing(PathBuf),

    /// The channel refused the content (corrupt or unsupported payload)
    #[error("Content rejected by channel: {0}")]
    Rejected(String),

    /// The channel API reported an error unrelated to the content
    #[error("Channel API error {code}: {description}")]
    Api { code: u16, description: String },

    /// Network failure talking to the channel
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The channel answered with something that is not a valid API response
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The file exists but could not be read
    #[error("Failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// Client configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChannelError {
    /// Check if the image file was missing
    pub fn is_file_missing(&self) -> bool {
        matches!(self, ChannelError::FileMissing(_))
    }

    /// Check if the channel rejected the content
    pub fn is_rejected(&self) -> bool {
        matches!(self, ChannelError::Rejected(_))
    }

    /// Check if the error must abort the whole publish invocation
    pub fn is_fatal(&self) -> bool {
        !self.is_file_missing() && !self.is_rejected()
    }
}

/// Convert reqwest errors, dropping the request URL because it embeds the bot token
impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();

        if err.is_timeout() {
            ChannelError::Timeout(err.to_string())
        } else if err.is_decode() {
            ChannelError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ChannelError::Configuration(err.to_string())
        } else {
            ChannelError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ChannelError {
    fn from(err: url::ParseError) -> Self {
        ChannelError::Configuration(format!("Invalid API URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let missing = ChannelError::FileMissing(PathBuf::from("/images/a.jpg"));
        assert!(missing.is_file_missing());
        assert!(!missing.is_fatal());

        let rejected = ChannelError::Rejected("IMAGE_PROCESS_FAILED".to_string());
        assert!(rejected.is_rejected());
        assert!(!rejected.is_fatal());

        let api = ChannelError::Api {
            code: 401,
            description: "Unauthorized".to_string(),
        };
        assert!(api.is_fatal());
        assert!(ChannelError::Transport("connection refused".to_string()).is_fatal());
        assert!(ChannelError::Timeout("60s".to_string()).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = ChannelError::FileMissing(PathBuf::from("/images/a.jpg"));
        assert_eq!(err.to_string(), "File not found: /images/a.jpg");

        let err = ChannelError::Api {
            code: 429,
            description: "Too Many Requests".to_string(),
        };
        assert_eq!(err.to_string(), "Channel API error 429: Too Many Requests");
    }
}
