//! Group entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named set of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    /// Group id.
    pub gid: String,
    /// Human-readable name.
    pub display_name: String,
}
