//! User repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::PageRequest;
use cumulus_entity::user::model::{CreateUser, User};

/// Repository for user account lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by uid.
    pub async fn find_by_uid(&self, uid: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Check whether a user exists.
    pub async fn exists(&self, uid: &str) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check user", e))?;
        Ok(found.is_some())
    }

    /// List users ordered by uid.
    pub async fn list(&self, page: &PageRequest) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY uid LIMIT ? OFFSET ?")
            .bind(page.sql_limit())
            .bind(page.sql_offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let backend = if data.backend.is_empty() {
            "Database"
        } else {
            data.backend.as_str()
        };
        let (avatar_mime, avatar_data) = match &data.avatar {
            Some((mime, bytes)) => (Some(mime.as_str()), Some(bytes.as_slice())),
            None => (None, None),
        };

        sqlx::query_as::<_, User>(
            "INSERT INTO users (uid, display_name, backend, email, avatar_mime, avatar_data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.uid)
        .bind(&data.display_name)
        .bind(backend)
        .bind(&data.email)
        .bind(avatar_mime)
        .bind(avatar_data)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict(format!("User '{}' already exists", data.uid))
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to create user", other),
        })
    }

    /// Change a user's display name.
    pub async fn update_display_name(&self, uid: &str, display_name: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET display_name = ? WHERE uid = ?")
            .bind(display_name)
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update display name", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;

    #[tokio::test]
    async fn test_create_and_page() {
        let db = DatabasePool::in_memory().await.expect("database");
        let repo = UserRepository::new(db.pool().clone());
        for uid in ["carol", "alice", "bob"] {
            repo.create(&CreateUser {
                uid: uid.into(),
                display_name: uid.to_uppercase(),
                ..CreateUser::default()
            })
            .await
            .expect("create user");
        }

        let first = repo.list(&PageRequest::new(2, 0)).await.expect("page 1");
        let uids: Vec<_> = first.iter().map(|u| u.uid.as_str()).collect();
        assert_eq!(uids, ["alice", "bob"]);
        assert_eq!(first[0].backend, "Database");
        assert_eq!(repo.count().await.expect("count"), 3);

        let dup = repo
            .create(&CreateUser {
                uid: "alice".into(),
                ..CreateUser::default()
            })
            .await
            .unwrap_err();
        assert!(dup.is_conflict());
    }
}
