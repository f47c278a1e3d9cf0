//! Database migration runner.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use cumulus_core::error::{AppError, ErrorKind};

/// One applied migration as recorded by sqlx.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MigrationStatus {
    /// Migration version.
    pub version: i64,
    /// Human readable description.
    pub description: String,
    /// Whether the migration completed.
    pub success: bool,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// List the migrations recorded in the database.
pub async fn migration_status(pool: &SqlitePool) -> Result<Vec<MigrationStatus>, AppError> {
    sqlx::query_as::<_, MigrationStatus>(
        "SELECT version, description, success FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read migrations", e))
}

/// Drop every table, then apply all migrations again.
pub async fn reset_database(pool: &SqlitePool) -> Result<(), AppError> {
    warn!("Dropping all tables");

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tables", e))?;

    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e))?;

    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to disable foreign keys", e))?;

    for table in &tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table.replace('"', "\"\"")))
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to drop {table}"), e)
            })?;
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enable foreign keys", e))?;
    drop(conn);

    run_migrations(pool).await
}
