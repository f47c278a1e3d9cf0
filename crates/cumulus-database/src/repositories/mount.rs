//! Mount repository implementation.

use sqlx::SqlitePool;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::mount::CachedMountInfo;

/// Repository for the `mounts` table.
#[derive(Debug, Clone)]
pub struct MountRepository {
    pool: SqlitePool,
}

impl MountRepository {
    /// Create a new mount repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All mounts of a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<CachedMountInfo>> {
        sqlx::query_as::<_, CachedMountInfo>(
            "SELECT user_id, storage_id, root_id, mount_point FROM mounts \
             WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user mounts", e))
    }

    /// All mounts of a storage.
    pub async fn find_by_storage(&self, storage_id: i64) -> AppResult<Vec<CachedMountInfo>> {
        sqlx::query_as::<_, CachedMountInfo>(
            "SELECT user_id, storage_id, root_id, mount_point FROM mounts \
             WHERE storage_id = ? ORDER BY id",
        )
        .bind(storage_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load storage mounts", e))
    }

    /// All mounts whose root is the given file id.
    pub async fn find_by_root(&self, root_id: i64) -> AppResult<Vec<CachedMountInfo>> {
        sqlx::query_as::<_, CachedMountInfo>(
            "SELECT user_id, storage_id, root_id, mount_point FROM mounts \
             WHERE root_id = ? ORDER BY id",
        )
        .bind(root_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load root mounts", e))
    }

    /// Insert a mount. Returns `false` when the user already has a mount
    /// with the same root.
    pub async fn insert(&self, mount: &CachedMountInfo) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO mounts (storage_id, root_id, user_id, mount_point) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(mount.storage_id)
        .bind(mount.root_id)
        .bind(&mount.user_id)
        .bind(&mount.mount_point)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert mount", e))?;
        Ok(result.rows_affected() > 0)
    }
}
