//! Dead property row model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored property of one path, in Clark notation (`{ns}name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Property {
    /// Owning user.
    #[sqlx(rename = "userid")]
    pub user_id: String,
    /// Path relative to the user's files root.
    #[sqlx(rename = "propertypath")]
    pub path: String,
    /// Property name in Clark notation.
    #[sqlx(rename = "propertyname")]
    pub name: String,
    /// Property value.
    #[sqlx(rename = "propertyvalue")]
    pub value: String,
}

/// One requested mutation: `Some` sets the value, `None` removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    /// Property name in Clark notation.
    pub name: String,
    /// New value, or `None` to remove.
    pub value: Option<String>,
}

impl PropertyChange {
    /// A change that sets `name` to `value`.
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A change that removes `name`.
    pub fn remove(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}
