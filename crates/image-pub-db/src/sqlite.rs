//! SQLite implementation of ImageRepository
//!
//! This module provides the concrete registry store using SQLite through SQLx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image_pub_core::{validate_image_name, ImageRecord, ImageStatus};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, instrument};

use crate::error::{DbError, DbResult};
use crate::repository::{ImageRepository, InsertOutcome};

const SELECT_COLUMNS: &str = "SELECT name, status, created_at, updated_at FROM images";

/// SQLite implementation of ImageRepository
#[derive(Debug, Clone)]
pub struct SqliteImageRepository {
    pool: SqlitePool,
}

impl SqliteImageRepository {
    /// Create a new SQLite image repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ImageRepository for SqliteImageRepository {
    #[instrument(skip(self))]
    async fn insert(&self, name: &str) -> DbResult<InsertOutcome> {
        validate_image_name(name)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO images (name, status, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(ImageStatus::NotPublished.code())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Image already registered");
            return Ok(InsertOutcome::Duplicate);
        }

        debug!("Image registered");
        Ok(InsertOutcome::Created)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> DbResult<Option<ImageRecord>> {
        let row = sqlx::query(&format!("{} WHERE name = ?", SELECT_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_record).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_status(
        &self,
        status: ImageStatus,
        limit: Option<u32>,
    ) -> DbResult<Vec<ImageRecord>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query(&format!(
            "{} WHERE status = ? ORDER BY id ASC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(status.code())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} images with status {}", rows.len(), status);
        rows.into_iter().map(row_to_record).collect()
    }

    #[instrument(skip(self))]
    async fn update_status(&self, name: &str, status: ImageStatus) -> DbResult<ImageRecord> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{} WHERE name = ?", SELECT_COLUMNS))
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

        let mut record = match row {
            Some(row) => row_to_record(row)?,
            None => return Err(DbError::NotFound(name.to_string())),
        };

        record.transition_to(status)?;

        sqlx::query("UPDATE images SET status = ?, updated_at = ? WHERE name = ?")
            .bind(record.status.code())
            .bind(record.updated_at)
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Image status updated to {}", status);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM images WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(name.to_string()));
        }

        debug!("Image record deleted");
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM images")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    async fn count_by_status(&self, status: ImageStatus) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM images WHERE status = ?")
            .bind(status.code())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}

fn row_to_record(row: SqliteRow) -> DbResult<ImageRecord> {
    let name: String = row.try_get("name")?;
    let code: i16 = row.try_get("status")?;
    let status = ImageStatus::from_code(code)
        .map_err(|e| DbError::InvalidData(format!("{} for image {}", e, name)))?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(ImageRecord {
        name,
        status,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, PoolConfig};
    use image_pub_core::RegistryError;

    async fn repository() -> SqliteImageRepository {
        let pool = create_pool(&PoolConfig::memory()).await.unwrap();
        SqliteImageRepository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_duplicate() {
        let repo = repository().await;

        assert_eq!(repo.insert("a.jpg").await.unwrap(), InsertOutcome::Created);
        assert_eq!(repo.insert("a.jpg").await.unwrap(), InsertOutcome::Duplicate);
        assert_eq!(repo.count().await.unwrap(), 1);

        let record = repo.find_by_name("a.jpg").await.unwrap().unwrap();
        assert_eq!(record.status, ImageStatus::NotPublished);
    }

    #[tokio::test]
    async fn test_insert_rejects_path_names() {
        let repo = repository().await;

        let err = repo.insert("../a.jpg").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(RegistryError::InvalidName(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_status_with_limit() {
        let repo = repository().await;
        for name in ["a.jpg", "b.png", "c.jpeg"] {
            repo.insert(name).await.unwrap();
        }
        repo.update_status("b.png", ImageStatus::Published)
            .await
            .unwrap();

        let pending = repo
            .find_by_status(ImageStatus::NotPublished, None)
            .await
            .unwrap();
        let names: Vec<&str> = pending.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.jpg"));
        assert!(names.contains(&"c.jpeg"));

        let one = repo
            .find_by_status(ImageStatus::NotPublished, Some(1))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].is_pending());

        let published = repo
            .find_by_status(ImageStatus::Published, Some(10))
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].name, "b.png");
    }

    #[tokio::test]
    async fn test_update_status_persists() {
        let repo = repository().await;
        repo.insert("a.jpg").await.unwrap();

        let updated = repo
            .update_status("a.jpg", ImageStatus::NotValid)
            .await
            .unwrap();
        assert_eq!(updated.status, ImageStatus::NotValid);

        let stored = repo.find_by_name("a.jpg").await.unwrap().unwrap();
        assert_eq!(stored.status, ImageStatus::NotValid);
        assert_eq!(repo.count_by_status(ImageStatus::NotValid).await.unwrap(), 1);
        assert_eq!(
            repo.count_by_status(ImageStatus::NotPublished).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_update_status_missing_record() {
        let repo = repository().await;

        let err = repo
            .update_status("ghost.png", ImageStatus::Published)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_status_refuses_backward_edge() {
        let repo = repository().await;
        repo.insert("a.jpg").await.unwrap();
        repo.update_status("a.jpg", ImageStatus::Published)
            .await
            .unwrap();

        let err = repo
            .update_status("a.jpg", ImageStatus::NotPublished)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(RegistryError::InvalidTransition { .. })
        ));

        let stored = repo.find_by_name("a.jpg").await.unwrap().unwrap();
        assert_eq!(stored.status, ImageStatus::Published);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repository().await;
        repo.insert("a.jpg").await.unwrap();

        repo.delete("a.jpg").await.unwrap();
        assert!(repo.find_by_name("a.jpg").await.unwrap().is_none());
        assert!(repo.delete("a.jpg").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = repository().await;
        assert!(repo.health_check().await.is_ok());
    }
}
