//! Comment repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::PageRequest;
use cumulus_entity::comment::Comment;

/// Repository for the `comments` table.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a comment by id.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find comment", e))
    }

    /// Insert a comment and return its new id.
    pub async fn insert(&self, comment: &Comment) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO comments (parent_id, topmost_parent_id, children_count, actor_type, \
             actor_id, message, verb, creation_timestamp, latest_child_timestamp, object_type, \
             object_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(comment.parent_id)
        .bind(comment.topmost_parent_id)
        .bind(comment.children_count)
        .bind(&comment.actor_type)
        .bind(&comment.actor_id)
        .bind(&comment.message)
        .bind(&comment.verb)
        .bind(comment.creation_timestamp)
        .bind(comment.latest_child_timestamp)
        .bind(&comment.object_type)
        .bind(&comment.object_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert comment", e))?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrite every column of a stored comment. Returns the number of
    /// affected rows.
    pub async fn update(&self, comment: &Comment) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE comments SET parent_id = ?, topmost_parent_id = ?, children_count = ?, \
             actor_type = ?, actor_id = ?, message = ?, verb = ?, creation_timestamp = ?, \
             latest_child_timestamp = ?, object_type = ?, object_id = ? WHERE id = ?",
        )
        .bind(comment.parent_id)
        .bind(comment.topmost_parent_id)
        .bind(comment.children_count)
        .bind(&comment.actor_type)
        .bind(&comment.actor_id)
        .bind(&comment.message)
        .bind(&comment.verb)
        .bind(comment.creation_timestamp)
        .bind(comment.latest_child_timestamp)
        .bind(&comment.object_type)
        .bind(&comment.object_id)
        .bind(comment.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update comment", e))?;
        Ok(result.rows_affected())
    }

    /// Number of direct replies to a comment.
    pub async fn count_children(&self, parent_id: i64) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE parent_id = ?")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count replies", e))
    }

    /// Every reply in a thread, newest first.
    pub async fn find_thread(&self, topmost_id: i64, page: &PageRequest) -> AppResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE topmost_parent_id = ? \
             ORDER BY creation_timestamp DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(topmost_id)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load thread", e))
    }

    /// Comments on an object, newest first, optionally only those created
    /// strictly after `not_older_than`.
    pub async fn find_for_object(
        &self,
        object_type: &str,
        object_id: &str,
        page: &PageRequest,
        not_older_than: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE object_type = ? AND object_id = ? \
             AND (? IS NULL OR creation_timestamp > ?) \
             ORDER BY creation_timestamp DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(object_type)
        .bind(object_id)
        .bind(not_older_than)
        .bind(not_older_than)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load comments", e))
    }

    /// Number of comments on an object.
    pub async fn count_for_object(&self, object_type: &str, object_id: &str) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE object_type = ? AND object_id = ?")
            .bind(object_type)
            .bind(object_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count comments", e))
    }

    /// Delete a single comment.
    pub async fn delete(&self, id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete comment", e))?;
        Ok(result.rows_affected())
    }

    /// Replace one actor with another on every comment.
    pub async fn rewrite_actor(
        &self,
        actor_type: &str,
        actor_id: &str,
        new_type: &str,
        new_id: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE comments SET actor_type = ?, actor_id = ? WHERE actor_type = ? AND actor_id = ?",
        )
        .bind(new_type)
        .bind(new_id)
        .bind(actor_type)
        .bind(actor_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rewrite actor", e))?;
        Ok(result.rows_affected())
    }

    /// Delete every comment on an object.
    pub async fn delete_for_object(&self, object_type: &str, object_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE object_type = ? AND object_id = ?")
            .bind(object_type)
            .bind(object_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete object comments", e)
            })?;
        Ok(result.rows_affected())
    }
}
