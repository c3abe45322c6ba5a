//! Cleanup service
//!
//! Reclaims disk space by deleting the files of published images. Records
//! stay in the registry unless row pruning is switched on, so a later scan
//! does not register the same name again.

use async_trait::async_trait;
use image_pub_core::ImageStatus;
use image_pub_db::ImageRepository;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dto::CleanupReport;
use crate::error::{ServiceError, ServiceResult};

/// Trait for the published-file sweep
#[async_trait]
pub trait CleanupService: Send + Sync {
    /// Delete `directory/name` for every published record
    async fn clean_published(&self, directory: &Path) -> ServiceResult<CleanupReport>;
}

/// Default implementation of CleanupService
pub struct DefaultCleanupService {
    repository: Arc<dyn ImageRepository>,
    prune_rows: bool,
}

impl DefaultCleanupService {
    /// Create a new cleanup service that keeps registry rows
    pub fn new(repository: Arc<dyn ImageRepository>) -> Self {
        Self {
            repository,
            prune_rows: false,
        }
    }

    /// Also delete the registry row of each handled record
    pub fn with_row_pruning(mut self, prune_rows: bool) -> Self {
        self.prune_rows = prune_rows;
        self
    }
}

#[async_trait]
impl CleanupService for DefaultCleanupService {
    #[instrument(skip(self), fields(directory = %directory.display(), prune_rows = self.prune_rows))]
    async fn clean_published(&self, directory: &Path) -> ServiceResult<CleanupReport> {
        let published = self
            .repository
            .find_by_status(ImageStatus::Published, None)
            .await?;

        let mut report = CleanupReport::default();

        for record in published {
            let path = record.path_in(directory);

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Deleted {}", path.display());
                    report.deleted.push(record.name.clone());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("{} already removed", path.display());
                    report.already_missing.push(record.name.clone());
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", path.display(), e);
                    return Err(ServiceError::io(path, e));
                }
            }

            if self.prune_rows {
                self.repository.delete(&record.name).await?;
                report.pruned_rows += 1;
            }
        }

        info!(
            "Cleanup complete: {} deleted, {} already missing, {} rows pruned",
            report.count(),
            report.already_missing.len(),
            report.pruned_rows
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_pub_db::{create_pool, PoolConfig, SqliteImageRepository};

    async fn repository_with(entries: &[(&str, ImageStatus)]) -> Arc<SqliteImageRepository> {
        let pool = create_pool(&PoolConfig::memory()).await.unwrap();
        let repository = Arc::new(SqliteImageRepository::new(pool));
        for (name, status) in entries {
            repository.insert(name).await.unwrap();
            if *status != ImageStatus::NotPublished {
                repository.update_status(name, *status).await.unwrap();
            }
        }
        repository
    }

    #[tokio::test]
    async fn test_only_published_files_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.jpg", "c.png"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }

        let repository = repository_with(&[
            ("a.jpg", ImageStatus::NotPublished),
            ("b.jpg", ImageStatus::Published),
            ("c.png", ImageStatus::NotFound),
        ])
        .await;
        let service = DefaultCleanupService::new(repository.clone());

        let report = service.clean_published(dir.path()).await.unwrap();
        assert_eq!(report.deleted, vec!["b.jpg"]);
        assert!(!dir.path().join("b.jpg").exists());
        assert!(dir.path().join("a.jpg").exists());
        assert!(dir.path().join("c.png").exists());
        assert_eq!(repository.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_missing_files_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kept.png"), b"data").unwrap();

        let repository = repository_with(&[
            ("kept.png", ImageStatus::Published),
            ("gone.png", ImageStatus::Published),
        ])
        .await;
        let service = DefaultCleanupService::new(repository);

        let report = service.clean_published(dir.path()).await.unwrap();
        assert_eq!(report.deleted, vec!["kept.png"]);
        assert_eq!(report.already_missing, vec!["gone.png"]);

        let again = service.clean_published(dir.path()).await.unwrap();
        assert_eq!(again.count(), 0);
        assert_eq!(again.already_missing.len(), 2);
    }

    #[tokio::test]
    async fn test_row_pruning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"data").unwrap();

        let repository = repository_with(&[
            ("a.jpg", ImageStatus::NotValid),
            ("b.jpg", ImageStatus::Published),
        ])
        .await;
        let service = DefaultCleanupService::new(repository.clone()).with_row_pruning(true);

        let report = service.clean_published(dir.path()).await.unwrap();
        assert_eq!(report.pruned_rows, 1);
        assert!(repository.find_by_name("b.jpg").await.unwrap().is_none());
        assert!(repository.find_by_name("a.jpg").await.unwrap().is_some());
    }
}
