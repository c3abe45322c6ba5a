//! Channel client trait

use async_trait::async_trait;
use std::path::Path;

use crate::error::ChannelResult;

/// Receipt for a delivered image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Identifier the channel assigned to the posted message, when it reports one
    pub message_id: Option<i64>,
}

impl Delivery {
    /// Receipt carrying a message identifier
    pub fn with_message_id(message_id: i64) -> Self {
        Self {
            message_id: Some(message_id),
        }
    }
}

/// Capability to deliver an image file to a channel
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Upload the file at `path` to the channel
    ///
    /// # Returns
    /// * `Ok(Delivery)` - The channel accepted the image
    /// * `Err(ChannelError::FileMissing)` - Nothing exists at `path`
    /// * `Err(ChannelError::Rejected)` - The channel refused the content
    /// * `Err(ChannelError)` - Any other failure, which callers treat as fatal
    async fn send(&self, path: &Path) -> ChannelResult<Delivery>;

    /// Human-readable destination, for logging
    fn destination(&self) -> String;
}
