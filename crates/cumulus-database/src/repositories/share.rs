//! Share repository implementation.

use sqlx::SqlitePool;
use tracing::debug;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::{PageRequest, PageResponse};
use cumulus_entity::share::{NewShare, Share, ShareType};

/// Repository for share CRUD, token lookup and re-share trees.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: SqlitePool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a share by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM share WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    /// Find a share by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM share WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find share by token", e)
            })
    }

    /// Direct re-shares of a share, ordered by id.
    pub async fn find_children(&self, parent_id: i64) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM share WHERE parent = ? ORDER BY id")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find children", e))
    }

    /// List shares created by a user, optionally of one type.
    pub async fn find_by_creator(
        &self,
        uid: &str,
        share_type: Option<ShareType>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Share>> {
        let type_code = share_type.map(ShareType::code);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM share WHERE uid_owner = ? AND (? IS NULL OR share_type = ?)",
        )
        .bind(uid)
        .bind(type_code)
        .bind(type_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count shares", e))?;

        let shares = sqlx::query_as::<_, Share>(
            "SELECT * FROM share WHERE uid_owner = ? AND (? IS NULL OR share_type = ?) \
             ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(uid)
        .bind(type_code)
        .bind(type_code)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))?;

        Ok(PageResponse::new(shares, *page, total as u64))
    }

    /// Shares received by a user directly or through one of their groups.
    pub async fn find_received(&self, uid: &str) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM share WHERE (share_type = ? AND share_with = ?) \
             OR (share_type = ? AND share_with IN (SELECT gid FROM group_user WHERE uid = ?)) \
             ORDER BY id",
        )
        .bind(ShareType::User.code())
        .bind(uid)
        .bind(ShareType::Group.code())
        .bind(uid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list received shares", e)
        })
    }

    /// Insert a share and return its id.
    pub async fn insert(&self, data: &NewShare, stime: i64) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO share (share_type, share_with, uid_owner, uid_fileowner, parent, \
             item_type, item_source, file_source, file_target, permissions, stime, token, \
             expiration, mail_send, password) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(data.share_type.code())
        .bind(&data.share_with)
        .bind(&data.uid_owner)
        .bind(&data.uid_fileowner)
        .bind(data.parent)
        .bind(&data.item_type)
        .bind(data.file_source)
        .bind(data.file_source)
        .bind(&data.file_target)
        .bind(data.permissions)
        .bind(stime)
        .bind(&data.token)
        .bind(data.expiration)
        .bind(&data.password)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create share", e))?;
        Ok(result.last_insert_rowid())
    }

    /// Delete the given shares in order inside one transaction.
    ///
    /// Either every row is removed or none is.
    pub async fn delete_all(&self, ids: &[i64]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut deleted = 0;
        for id in ids {
            let result = sqlx::query("DELETE FROM share WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        format!("Failed to delete share {id}"),
                        e,
                    )
                })?;
            debug!(share_id = id, rows = result.rows_affected(), "Deleted share row");
            deleted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit share deletion", e)
        })?;
        Ok(deleted)
    }
}
