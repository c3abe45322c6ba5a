//! Publication service
//!
//! Publishes exactly one pending image per invocation. Candidates are taken
//! oldest first; a candidate whose file is gone becomes `NotFound`, one the
//! channel refuses becomes `NotValid`, and the loop moves on to the next.
//! Any other channel failure aborts the invocation and leaves the current
//! candidate pending.

use async_trait::async_trait;
use image_pub_channel::ChannelClient;
use image_pub_core::{ImageRecord, ImageStatus};
use image_pub_db::ImageRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::{PublishOutcome, PublishReport, PublishedImage};
use crate::error::ServiceResult;

/// Trait for publishing pending images
#[async_trait]
pub trait PublicationService: Send + Sync {
    /// Publish the next pending image found in `directory`
    ///
    /// # Returns
    /// * `Ok(report)` with `PublishOutcome::Published` - One image was delivered
    /// * `Ok(report)` with `PublishOutcome::NoPendingImages` - Nothing left to try
    /// * `Err(ServiceError)` - Transport or registry failure; the invocation must stop
    async fn publish_next(&self, directory: &Path) -> ServiceResult<PublishReport>;
}

/// Default implementation of PublicationService
pub struct DefaultPublicationService {
    repository: Arc<dyn ImageRepository>,
    channel: Arc<dyn ChannelClient>,
}

impl DefaultPublicationService {
    /// Create a new publication service
    pub fn new(repository: Arc<dyn ImageRepository>, channel: Arc<dyn ChannelClient>) -> Self {
        Self {
            repository,
            channel,
        }
    }

    async fn next_candidate(&self) -> ServiceResult<Option<ImageRecord>> {
        let mut candidates = self
            .repository
            .find_by_status(ImageStatus::NotPublished, Some(1))
            .await?;
        Ok(candidates.pop())
    }
}

#[async_trait]
impl PublicationService for DefaultPublicationService {
    #[instrument(skip(self), fields(directory = %directory.display(), channel = %self.channel.destination()))]
    async fn publish_next(&self, directory: &Path) -> ServiceResult<PublishReport> {
        let mut report = PublishReport::new();

        while let Some(candidate) = self.next_candidate().await? {
            let path = candidate.path_in(directory);

            match self.channel.send(&path).await {
                Ok(delivery) => {
                    self.repository
                        .update_status(&candidate.name, ImageStatus::Published)
                        .await?;
                    info!("Published {}", candidate.name);

                    report.outcome = PublishOutcome::Published(PublishedImage {
                        name: candidate.name,
                        message_id: delivery.message_id,
                    });
                    return Ok(report);
                }
                Err(err) if err.is_file_missing() => {
                    error!("Image {} not found: {}", candidate.name, err);
                    self.repository
                        .update_status(&candidate.name, ImageStatus::NotFound)
                        .await?;
                    report.not_found.push(candidate.name);
                }
                Err(err) if err.is_rejected() => {
                    warn!("Image {} rejected by channel: {}", candidate.name, err);
                    self.repository
                        .update_status(&candidate.name, ImageStatus::NotValid)
                        .await?;
                    report.not_valid.push(candidate.name);
                }
                Err(err) => {
                    error!("Publishing {} failed: {}", candidate.name, err);
                    return Err(err.into());
                }
            }
        }

        warn!("No pending images to publish");
        Ok(report)
    }
}
