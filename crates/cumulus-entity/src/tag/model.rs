//! System tag entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An administrator-defined tag.
///
/// `(name, user_visible, user_assignable)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct SystemTag {
    /// Tag id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether regular users can see the tag.
    #[sqlx(rename = "visibility")]
    pub user_visible: bool,
    /// Whether regular users can assign the tag.
    #[sqlx(rename = "editable")]
    pub user_assignable: bool,
}

impl SystemTag {
    /// Human readable description of the identity tuple, used in error
    /// messages.
    pub fn describe(name: &str, user_visible: bool, user_assignable: bool) -> String {
        format!("{name}, visible: {user_visible}, assignable: {user_assignable}")
    }
}

/// An object a tag can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagObject {
    /// Kind of object, usually `files`.
    pub object_type: String,
    /// Object identifier.
    pub object_id: String,
}
