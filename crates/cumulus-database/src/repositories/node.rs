//! File cache repository implementation.

use sqlx::SqlitePool;
use tracing::debug;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::node::{Node, Storage};
use cumulus_entity::share::Permissions;

const NODE_COLUMNS: &str = "f.file_id, f.storage, s.id AS storage_string_id, f.owner, f.path, \
     f.name, f.parent, f.is_folder, f.permissions \
     FROM filecache f JOIN storages s ON s.numeric_id = f.storage";

/// Repository for storages and file cache rows.
#[derive(Debug, Clone)]
pub struct NodeRepository {
    pool: SqlitePool,
}

impl NodeRepository {
    /// Create a new node repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find or register a storage by its string id.
    pub async fn ensure_storage(&self, id: &str) -> AppResult<Storage> {
        sqlx::query("INSERT OR IGNORE INTO storages (id) VALUES (?)")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register storage", e))?;

        sqlx::query_as::<_, Storage>("SELECT * FROM storages WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find storage", e))
    }

    /// Find a storage by numeric id.
    pub async fn find_storage(&self, numeric_id: i64) -> AppResult<Option<Storage>> {
        sqlx::query_as::<_, Storage>("SELECT * FROM storages WHERE numeric_id = ?")
            .bind(numeric_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find storage", e))
    }

    /// Find or create the root folder of a user's home storage.
    pub async fn ensure_home(&self, uid: &str) -> AppResult<Node> {
        let storage = self.ensure_storage(&Storage::home_id(uid)).await?;
        if let Some(root) = self.find_by_path(storage.numeric_id, "").await? {
            return Ok(root);
        }
        debug!(uid = %uid, storage = storage.numeric_id, "Creating home root");
        self.insert(storage.numeric_id, uid, -1, "", "", true, Permissions::ALL)
            .await
    }

    /// Insert a file cache row.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        storage: i64,
        owner: &str,
        parent: i64,
        path: &str,
        name: &str,
        is_folder: bool,
        permissions: Permissions,
    ) -> AppResult<Node> {
        let result = sqlx::query(
            "INSERT INTO filecache (storage, owner, path, name, parent, is_folder, permissions) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(storage)
        .bind(owner)
        .bind(path)
        .bind(name)
        .bind(parent)
        .bind(is_folder)
        .bind(permissions)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict(format!("'{path}' already exists"))
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to insert node", other),
        })?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Node {id} vanished after insert")))
    }

    /// Find a node by file id.
    pub async fn find_by_id(&self, file_id: i64) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(&format!("SELECT {NODE_COLUMNS} WHERE f.file_id = ?"))
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))
    }

    /// Find a node by storage and relative path.
    pub async fn find_by_path(&self, storage: i64, path: &str) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} WHERE f.storage = ? AND f.path = ?"
        ))
        .bind(storage)
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))
    }

    /// Direct children of a folder, ordered by name.
    pub async fn children(&self, file_id: i64) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} WHERE f.parent = ? ORDER BY f.name"
        ))
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }
}
