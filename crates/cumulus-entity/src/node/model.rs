//! File cache node and storage models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::share::Permissions;

/// A registered storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Storage {
    /// Numeric id used by the file cache.
    pub numeric_id: i64,
    /// String id, e.g. `home::alice`.
    pub id: String,
}

impl Storage {
    /// String id of a user's home storage.
    pub fn home_id(user_id: &str) -> String {
        format!("home::{user_id}")
    }
}

/// A file or folder in the file cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// File id.
    pub file_id: i64,
    /// Numeric storage id.
    pub storage: i64,
    /// String storage id.
    pub storage_string_id: String,
    /// Owner of the storage.
    pub owner: String,
    /// Path relative to the owner's home, `""` for the root.
    pub path: String,
    /// Base name.
    pub name: String,
    /// Parent file id, -1 for a storage root.
    pub parent: i64,
    /// Whether the node is a folder.
    pub is_folder: bool,
    /// Permissions the owner has on the node.
    pub permissions: Permissions,
}

impl Node {
    /// `"folder"` or `"file"`.
    pub fn item_type(&self) -> &'static str {
        if self.is_folder { "folder" } else { "file" }
    }

    /// Whether this is the root of its storage.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Path as seen by the owner, with a leading slash.
    pub fn user_path(&self) -> String {
        format!("/{}", self.path)
    }
}
