//! Service layer for image-pub
//!
//! This crate implements the three workflows on top of the registry and a
//! channel client:
//!
//! - **DiscoveryService**: registers new images found in a directory
//! - **PublicationService**: publishes the next pending image
//! - **CleanupService**: deletes the files of published images
//!
//! `ServiceRegistry` is the explicit context the binary builds once at
//! startup and hands to whichever command runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use image_pub_service::ServiceRegistryBuilder;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     repository: Arc<dyn image_pub_db::ImageRepository>,
//! #     channel: Arc<dyn image_pub_channel::ChannelClient>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let services = ServiceRegistryBuilder::new()
//!     .repository(repository)
//!     .channel(channel)
//!     .build()?;
//!
//! services.discovery().scan(Path::new("images")).await?;
//! let report = services.publication()?.publish_next(Path::new("images")).await?;
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod discovery;
pub mod dto;
pub mod error;
pub mod publication;

// Re-export main types for convenience
pub use dto::*;
pub use error::{ServiceError, ServiceResult};

// Re-export service traits and implementations
pub use cleanup::{CleanupService, DefaultCleanupService};
pub use discovery::{DefaultDiscoveryService, DiscoveryService};
pub use publication::{DefaultPublicationService, PublicationService};

use image_pub_channel::ChannelClient;
use image_pub_db::ImageRepository;
use std::sync::Arc;

/// Service registry that holds all service instances
///
/// Publication needs a channel client; registries built without one can
/// still scan and clean.
#[derive(Clone)]
pub struct ServiceRegistry {
    /// Registry storage shared by every service
    pub repository: Arc<dyn ImageRepository>,
    /// Discovery service
    pub discovery: Arc<dyn DiscoveryService>,
    /// Publication service, present when a channel is configured
    pub publication: Option<Arc<dyn PublicationService>>,
    /// Cleanup service
    pub cleanup: Arc<dyn CleanupService>,
}

impl ServiceRegistry {
    /// Create a service registry with default implementations
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        channel: Option<Arc<dyn ChannelClient>>,
    ) -> Self {
        let discovery = Arc::new(DefaultDiscoveryService::new(repository.clone()));
        let cleanup = Arc::new(DefaultCleanupService::new(repository.clone()));
        let publication = channel.map(|channel| {
            Arc::new(DefaultPublicationService::new(repository.clone(), channel))
                as Arc<dyn PublicationService>
        });

        Self {
            repository,
            discovery,
            publication,
            cleanup,
        }
    }

    /// Get the registry storage
    pub fn repository(&self) -> &Arc<dyn ImageRepository> {
        &self.repository
    }

    /// Get the discovery service
    pub fn discovery(&self) -> &Arc<dyn DiscoveryService> {
        &self.discovery
    }

    /// Get the publication service
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidInput` if no channel client was configured.
    pub fn publication(&self) -> ServiceResult<&Arc<dyn PublicationService>> {
        self.publication.as_ref().ok_or_else(|| {
            ServiceError::InvalidInput("publishing requires a channel client".to_string())
        })
    }

    /// Get the cleanup service
    pub fn cleanup(&self) -> &Arc<dyn CleanupService> {
        &self.cleanup
    }
}

/// Builder for ServiceRegistry with custom configuration
#[derive(Default)]
pub struct ServiceRegistryBuilder {
    repository: Option<Arc<dyn ImageRepository>>,
    channel: Option<Arc<dyn ChannelClient>>,
    prune_rows: bool,
    discovery: Option<Arc<dyn DiscoveryService>>,
    publication: Option<Arc<dyn PublicationService>>,
    cleanup: Option<Arc<dyn CleanupService>>,
}

impl ServiceRegistryBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repository
    pub fn repository(mut self, repository: Arc<dyn ImageRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set the channel client used for publishing
    pub fn channel(mut self, channel: Arc<dyn ChannelClient>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Remove registry rows after their published file is deleted
    pub fn prune_published_rows(mut self, prune_rows: bool) -> Self {
        self.prune_rows = prune_rows;
        self
    }

    /// Set a custom discovery service
    pub fn discovery_service(mut self, service: Arc<dyn DiscoveryService>) -> Self {
        self.discovery = Some(service);
        self
    }

    /// Set a custom publication service
    pub fn publication_service(mut self, service: Arc<dyn PublicationService>) -> Self {
        self.publication = Some(service);
        self
    }

    /// Set a custom cleanup service
    pub fn cleanup_service(mut self, service: Arc<dyn CleanupService>) -> Self {
        self.cleanup = Some(service);
        self
    }

    /// Build the service registry
    ///
    /// Default implementations are created for any services not explicitly set.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository was set.
    pub fn build(self) -> ServiceResult<ServiceRegistry> {
        let repository = self
            .repository
            .ok_or_else(|| ServiceError::InvalidInput("repository is required".to_string()))?;

        let discovery = self
            .discovery
            .unwrap_or_else(|| Arc::new(DefaultDiscoveryService::new(repository.clone())));

        let publication = match (self.publication, self.channel) {
            (Some(service), _) => Some(service),
            (None, Some(channel)) => Some(Arc::new(DefaultPublicationService::new(
                repository.clone(),
                channel,
            )) as Arc<dyn PublicationService>),
            (None, None) => None,
        };

        let prune_rows = self.prune_rows;
        let cleanup = self.cleanup.unwrap_or_else(|| {
            Arc::new(DefaultCleanupService::new(repository.clone()).with_row_pruning(prune_rows))
        });

        Ok(ServiceRegistry {
            repository,
            discovery,
            publication,
            cleanup,
        })
    }
}
