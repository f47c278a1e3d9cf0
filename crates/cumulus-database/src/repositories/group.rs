//! Group repository implementation.

use sqlx::SqlitePool;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::user::Group;

/// Repository for groups and memberships.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: SqlitePool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a group by gid.
    pub async fn find_by_gid(&self, gid: &str) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE gid = ?")
            .bind(gid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find group", e))
    }

    /// List all groups.
    pub async fn list(&self) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY gid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list groups", e))
    }

    /// Create a group.
    pub async fn create(&self, gid: &str, display_name: &str) -> AppResult<Group> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (gid, display_name) VALUES (?, ?) RETURNING *",
        )
        .bind(gid)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict(format!("Group '{gid}' already exists"))
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to create group", other),
        })
    }

    /// Add a user to a group. Adding an existing member is a no-op.
    pub async fn add_member(&self, gid: &str, uid: &str) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO group_user (gid, uid) VALUES (?, ?)")
            .bind(gid)
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add member", e))?;
        Ok(())
    }

    /// Remove a user from a group.
    pub async fn remove_member(&self, gid: &str, uid: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM group_user WHERE gid = ? AND uid = ?")
            .bind(gid)
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove member", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Check group membership.
    pub async fn is_member(&self, gid: &str, uid: &str) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM group_user WHERE gid = ? AND uid = ?")
                .bind(gid)
                .bind(uid)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to check membership", e)
                })?;
        Ok(found.is_some())
    }

    /// Members of a group, ordered by uid.
    pub async fn members(&self, gid: &str) -> AppResult<Vec<String>> {
        sqlx::query_scalar("SELECT uid FROM group_user WHERE gid = ? ORDER BY uid")
            .bind(gid)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list members", e))
    }
}
