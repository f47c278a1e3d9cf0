//! System tag and tag relation repository implementation.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::tag::SystemTag;

/// Repository for `systemtag` and `systemtag_object_mapping`.
#[derive(Debug, Clone)]
pub struct SystemTagRepository {
    pool: SqlitePool,
}

/// Escape `\`, `%` and `_` so user input matches literally inside LIKE.
pub fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_write_error(e: sqlx::Error, name: &str, visible: bool, assignable: bool) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::conflict(format!(
            "Tag ({}) already exists",
            SystemTag::describe(name, visible, assignable)
        )),
        other => AppError::with_source(ErrorKind::Database, "Failed to write tag", other),
    }
}

impl SystemTagRepository {
    /// Create a new tag repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tags with the given ids, ordered by name, visibility and editability.
    pub async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<SystemTag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM systemtag WHERE id IN (");
        let mut list = qb.separated(", ");
        for id in ids {
            list.push_bind(*id);
        }
        list.push_unseparated(") ORDER BY name, visibility, editable");

        qb.build_query_as::<SystemTag>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load tags", e))
    }

    /// All tags, optionally filtered by visibility and a substring of the
    /// name.
    pub async fn find_all(
        &self,
        visible: Option<bool>,
        name_search: Option<&str>,
    ) -> AppResult<Vec<SystemTag>> {
        let pattern = name_search
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        sqlx::query_as::<_, SystemTag>(
            "SELECT * FROM systemtag WHERE (? IS NULL OR visibility = ?) \
             AND (? IS NULL OR name LIKE ? ESCAPE '\\') \
             ORDER BY name, visibility, editable",
        )
        .bind(visible)
        .bind(visible)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tags", e))
    }

    /// Find a tag by its identity tuple.
    pub async fn find_by_identity(
        &self,
        name: &str,
        visible: bool,
        assignable: bool,
    ) -> AppResult<Option<SystemTag>> {
        sqlx::query_as::<_, SystemTag>(
            "SELECT * FROM systemtag WHERE name = ? AND visibility = ? AND editable = ?",
        )
        .bind(name)
        .bind(visible)
        .bind(assignable)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tag", e))
    }

    /// Insert a tag. A duplicate identity tuple yields a conflict error.
    pub async fn insert(&self, name: &str, visible: bool, assignable: bool) -> AppResult<SystemTag> {
        sqlx::query_as::<_, SystemTag>(
            "INSERT INTO systemtag (name, visibility, editable) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(visible)
        .bind(assignable)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name, visible, assignable))
    }

    /// Rewrite a tag. Returns the number of affected rows.
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        visible: bool,
        assignable: bool,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE systemtag SET name = ?, visibility = ?, editable = ? WHERE id = ?",
        )
        .bind(name)
        .bind(visible)
        .bind(assignable)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name, visible, assignable))?;
        Ok(result.rows_affected())
    }

    /// Delete tags and their object relations. Returns the number of tags
    /// removed.
    pub async fn delete(&self, ids: &[i64]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut qb =
            QueryBuilder::<Sqlite>::new("DELETE FROM systemtag_object_mapping WHERE systemtagid IN (");
        let mut list = qb.separated(", ");
        for id in ids {
            list.push_bind(*id);
        }
        list.push_unseparated(")");
        qb.build().execute(&mut *tx).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete tag relations", e)
        })?;

        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM systemtag WHERE id IN (");
        let mut list = qb.separated(", ");
        for id in ids {
            list.push_bind(*id);
        }
        list.push_unseparated(")");
        let result = qb
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete tags", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
        Ok(result.rows_affected())
    }

    /// Tag ids assigned to each requested object. Every requested object
    /// appears in the map, possibly with no tags.
    pub async fn tag_ids_for_objects(
        &self,
        object_type: &str,
        object_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<i64>>> {
        let mut mapping: HashMap<String, Vec<i64>> = object_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        if object_ids.is_empty() {
            return Ok(mapping);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT objectid, systemtagid FROM systemtag_object_mapping WHERE objecttype = ",
        );
        qb.push_bind(object_type);
        qb.push(" AND objectid IN (");
        let mut list = qb.separated(", ");
        for id in object_ids {
            list.push_bind(id.as_str());
        }
        list.push_unseparated(") ORDER BY objectid, systemtagid");

        let rows: Vec<(String, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load relations", e))?;

        for (object_id, tag_id) in rows {
            mapping.entry(object_id).or_default().push(tag_id);
        }
        Ok(mapping)
    }

    /// Objects of a type carrying any of the given tags.
    pub async fn object_ids_for_tags(
        &self,
        object_type: &str,
        tag_ids: &[i64],
    ) -> AppResult<Vec<String>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT DISTINCT objectid FROM systemtag_object_mapping WHERE objecttype = ",
        );
        qb.push_bind(object_type);
        qb.push(" AND systemtagid IN (");
        let mut list = qb.separated(", ");
        for id in tag_ids {
            list.push_bind(*id);
        }
        list.push_unseparated(") ORDER BY objectid");

        qb.build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load objects", e))
    }

    /// Assign tags to an object. Existing relations are kept.
    pub async fn assign(&self, object_type: &str, object_id: &str, tag_ids: &[i64]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        for tag_id in tag_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO systemtag_object_mapping (objectid, objecttype, systemtagid) \
                 VALUES (?, ?, ?)",
            )
            .bind(object_id)
            .bind(object_type)
            .bind(tag_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign tag", e))?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))
    }

    /// Remove tags from an object.
    pub async fn unassign(
        &self,
        object_type: &str,
        object_id: &str,
        tag_ids: &[i64],
    ) -> AppResult<u64> {
        if tag_ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new(
            "DELETE FROM systemtag_object_mapping WHERE objecttype = ",
        );
        qb.push_bind(object_type);
        qb.push(" AND objectid = ");
        qb.push_bind(object_id);
        qb.push(" AND systemtagid IN (");
        let mut list = qb.separated(", ");
        for id in tag_ids {
            list.push_bind(*id);
        }
        list.push_unseparated(")");

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unassign tags", e))?;
        Ok(result.rows_affected())
    }
}
