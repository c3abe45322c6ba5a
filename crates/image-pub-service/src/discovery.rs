//! Discovery service
//!
//! Scans an image directory (non-recursively) and registers every supported
//! image file that is not yet known. Only names are inspected; file contents
//! are never read.

use async_trait::async_trait;
use image_pub_core::{is_supported_image, validate_image_name};
use image_pub_db::ImageRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dto::ScanReport;
use crate::error::{ServiceError, ServiceResult};

/// Trait for directory discovery
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Register all new supported images found directly in `directory`
    async fn scan(&self, directory: &Path) -> ServiceResult<ScanReport>;
}

/// Default implementation of DiscoveryService
pub struct DefaultDiscoveryService {
    repository: Arc<dyn ImageRepository>,
}

impl DefaultDiscoveryService {
    /// Create a new discovery service
    pub fn new(repository: Arc<dyn ImageRepository>) -> Self {
        Self { repository }
    }

    /// List candidate names, sorted so registration order is reproducible
    async fn list_candidates(&self, directory: &Path) -> ServiceResult<(Vec<String>, usize)> {
        let mut entries = tokio::fs::read_dir(directory)
            .await
            .map_err(|e| ServiceError::io(directory, e))?;

        let mut names = Vec::new();
        let mut ignored = 0;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServiceError::io(directory, e))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!("Skipping non UTF-8 entry {:?}", file_name);
                ignored += 1;
                continue;
            };

            if !is_supported_image(name) {
                debug!("Skipping {}: unsupported extension", name);
                ignored += 1;
                continue;
            }

            if let Err(e) = validate_image_name(name) {
                warn!("Skipping {:?}: {}", name, e);
                ignored += 1;
                continue;
            }

            // Follows symlinks, so a link to an image counts as an image
            let is_file = match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) => metadata.is_file(),
                Err(_) => false,
            };
            if !is_file {
                debug!("Skipping {}: not a regular file", name);
                ignored += 1;
                continue;
            }

            names.push(name.to_string());
        }

        names.sort();
        Ok((names, ignored))
    }
}

#[async_trait]
impl DiscoveryService for DefaultDiscoveryService {
    #[instrument(skip(self), fields(directory = %directory.display()))]
    async fn scan(&self, directory: &Path) -> ServiceResult<ScanReport> {
        let (names, ignored) = self.list_candidates(directory).await?;

        let mut report = ScanReport {
            ignored,
            ..ScanReport::default()
        };

        for name in names {
            if self.repository.insert(&name).await?.is_created() {
                debug!("Registered {}", name);
                report.registered.push(name);
            } else {
                report.duplicates += 1;
            }
        }

        info!(
            "Scan complete: {} registered, {} already known, {} ignored",
            report.count(),
            report.duplicates,
            report.ignored
        );

        Ok(report)
    }
}
