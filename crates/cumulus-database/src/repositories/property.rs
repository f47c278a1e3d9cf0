//! Dead property repository implementation.

use sqlx::SqlitePool;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::property::{Property, PropertyChange};

/// Repository for the `properties` table.
#[derive(Debug, Clone)]
pub struct PropertyRepository {
    pool: SqlitePool,
}

impl PropertyRepository {
    /// Create a new property repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every stored property of a path.
    pub async fn find_for_path(&self, user_id: &str, path: &str) -> AppResult<Vec<Property>> {
        sqlx::query_as::<_, Property>(
            "SELECT userid, propertypath, propertyname, propertyvalue FROM properties \
             WHERE userid = ? AND propertypath = ? ORDER BY propertyname",
        )
        .bind(user_id)
        .bind(path)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load properties", e))
    }

    /// Apply a batch of changes atomically.
    pub async fn apply_changes(
        &self,
        user_id: &str,
        path: &str,
        changes: &[PropertyChange],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        for change in changes {
            let result = match &change.value {
                None => {
                    sqlx::query(
                        "DELETE FROM properties \
                         WHERE userid = ? AND propertypath = ? AND propertyname = ?",
                    )
                    .bind(user_id)
                    .bind(path)
                    .bind(&change.name)
                    .execute(&mut *tx)
                    .await
                }
                Some(value) => {
                    sqlx::query(
                        "INSERT INTO properties (userid, propertypath, propertyname, propertyvalue) \
                         VALUES (?, ?, ?, ?) \
                         ON CONFLICT (userid, propertypath, propertyname) \
                         DO UPDATE SET propertyvalue = excluded.propertyvalue",
                    )
                    .bind(user_id)
                    .bind(path)
                    .bind(&change.name)
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                }
            };
            result.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to store property {}", change.name),
                    e,
                )
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))
    }

    /// Drop every property of a path.
    pub async fn delete_for_path(&self, user_id: &str, path: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM properties WHERE userid = ? AND propertypath = ?")
            .bind(user_id)
            .bind(path)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete properties", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Re-key every property of `source` to `destination`. Whatever the
    /// destination held before is dropped in the same transaction.
    pub async fn move_path(&self, user_id: &str, source: &str, destination: &str) -> AppResult<u64> {
        if source == destination {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM properties WHERE userid = ? AND propertypath = ?")
            .bind(user_id)
            .bind(destination)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear destination properties", e)
            })?;

        let result = sqlx::query(
            "UPDATE properties SET propertypath = ? WHERE userid = ? AND propertypath = ?",
        )
        .bind(destination)
        .bind(user_id)
        .bind(source)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move properties", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;

    #[tokio::test]
    async fn test_apply_changes_upserts_and_removes() {
        let db = DatabasePool::in_memory().await.expect("database");
        let repo = PropertyRepository::new(db.pool().clone());

        repo.apply_changes(
            "alice",
            "docs/a.txt",
            &[
                PropertyChange::set("{urn:x}color", "red"),
                PropertyChange::set("{urn:x}size", "L"),
            ],
        )
        .await
        .expect("insert");
        repo.apply_changes(
            "alice",
            "docs/a.txt",
            &[
                PropertyChange::set("{urn:x}color", "blue"),
                PropertyChange::remove("{urn:x}size"),
            ],
        )
        .await
        .expect("update");

        let props = repo.find_for_path("alice", "docs/a.txt").await.expect("load");
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name, "{urn:x}color");
        assert_eq!(props[0].value, "blue");

        assert_eq!(repo.move_path("alice", "docs/a.txt", "b.txt").await.expect("move"), 1);
        assert!(repo.find_for_path("alice", "docs/a.txt").await.expect("old").is_empty());
        assert_eq!(repo.delete_for_path("alice", "b.txt").await.expect("delete"), 1);
    }

    #[tokio::test]
    async fn test_move_path_replaces_destination_properties() {
        let db = DatabasePool::in_memory().await.expect("database");
        let repo = PropertyRepository::new(db.pool().clone());

        repo.apply_changes("alice", "a.txt", &[PropertyChange::set("{urn:x}color", "blue")])
            .await
            .expect("source");
        repo.apply_changes(
            "alice",
            "b.txt",
            &[
                PropertyChange::set("{urn:x}color", "red"),
                PropertyChange::set("{urn:x}shape", "round"),
            ],
        )
        .await
        .expect("destination");
        repo.apply_changes("bob", "b.txt", &[PropertyChange::set("{urn:x}color", "green")])
            .await
            .expect("other user");

        assert_eq!(repo.move_path("alice", "a.txt", "b.txt").await.expect("move"), 1);

        let props = repo.find_for_path("alice", "b.txt").await.expect("load");
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name, "{urn:x}color");
        assert_eq!(props[0].value, "blue");
        assert!(repo.find_for_path("alice", "a.txt").await.expect("old").is_empty());
        assert_eq!(repo.find_for_path("bob", "b.txt").await.expect("bob").len(), 1);

        assert_eq!(repo.move_path("alice", "b.txt", "b.txt").await.expect("same"), 0);
        assert_eq!(repo.find_for_path("alice", "b.txt").await.expect("kept").len(), 1);
    }
}
