//! Cached mount model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A storage mounted into a user's file tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct CachedMountInfo {
    /// User the mount belongs to.
    pub user_id: String,
    /// Numeric id of the mounted storage.
    pub storage_id: i64,
    /// File id of the mount's root node.
    pub root_id: i64,
    /// Absolute mount point, e.g. `/alice/`.
    pub mount_point: String,
}

impl CachedMountInfo {
    /// The mount point of a user's home storage.
    pub fn home_mount_point(user_id: &str) -> String {
        format!("/{user_id}/")
    }
}
