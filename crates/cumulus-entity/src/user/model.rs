//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account known to the instance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique login name.
    pub uid: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Name of the user backend that owns the account.
    pub backend: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// MIME type of the avatar image.
    pub avatar_mime: Option<String>,
    /// Raw avatar image bytes.
    #[serde(skip_serializing)]
    pub avatar_data: Option<Vec<u8>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to the uid when empty.
    pub fn display_name_or_uid(&self) -> &str {
        if self.display_name.is_empty() {
            &self.uid
        } else {
            &self.display_name
        }
    }

    /// Avatar bytes and MIME type, when the user has an avatar.
    pub fn avatar(&self) -> Option<(&str, &[u8])> {
        match (&self.avatar_mime, &self.avatar_data) {
            (Some(mime), Some(data)) if !data.is_empty() => Some((mime.as_str(), data.as_slice())),
            _ => None,
        }
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired uid.
    pub uid: String,
    /// Display name.
    pub display_name: String,
    /// Backend name, `Database` when empty.
    pub backend: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Avatar MIME type and bytes.
    pub avatar: Option<(String, Vec<u8>)>,
}
