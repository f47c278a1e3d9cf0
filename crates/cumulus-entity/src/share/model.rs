//! Share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::permission::Permissions;
use super::share_type::ShareType;

/// A share granting access to a file or folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Share {
    /// Unique share identifier.
    pub id: i64,
    /// Type of share.
    #[sqlx(try_from = "i32")]
    pub share_type: ShareType,
    /// Recipient uid, gid or remote address; `None` for links.
    pub share_with: Option<String>,
    /// User who created the share.
    pub uid_owner: String,
    /// Owner of the shared node.
    pub uid_fileowner: String,
    /// The received share this one re-shares.
    pub parent: Option<i64>,
    /// `"file"` or `"folder"`.
    pub item_type: String,
    /// File id of the shared node.
    pub item_source: i64,
    /// File id of the shared node.
    pub file_source: i64,
    /// Mount path in the recipient's tree, e.g. `/report.odt`.
    pub file_target: String,
    /// Permission bitmask granted.
    pub permissions: Permissions,
    /// Unix time the share was created.
    pub stime: i64,
    /// Link or federation token.
    pub token: Option<String>,
    /// When the share expires (midnight).
    pub expiration: Option<DateTime<Utc>>,
    /// Whether a notification mail was sent.
    pub mail_send: bool,
    /// Argon2 password hash for link shares.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Share {
    /// The user who created the share.
    pub fn shared_by(&self) -> &str {
        &self.uid_owner
    }

    /// The owner of the shared node.
    pub fn share_owner(&self) -> &str {
        &self.uid_fileowner
    }

    /// Check if the share has expired.
    pub fn is_expired(&self) -> bool {
        self.expiration.is_some_and(|at| at <= Utc::now())
    }

    /// Check if the share is protected by a password.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

/// Data required to create a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShare {
    /// Type of share.
    pub share_type: ShareType,
    /// Recipient.
    pub share_with: Option<String>,
    /// User creating the share.
    pub uid_owner: String,
    /// Owner of the shared node.
    pub uid_fileowner: String,
    /// Parent share for re-shares.
    pub parent: Option<i64>,
    /// `"file"` or `"folder"`.
    pub item_type: String,
    /// File id of the shared node.
    pub file_source: i64,
    /// Mount path in the recipient's tree.
    pub file_target: String,
    /// Permission bitmask.
    pub permissions: Permissions,
    /// Link or federation token.
    pub token: Option<String>,
    /// Expiry time (None = never).
    pub expiration: Option<DateTime<Utc>>,
    /// Pre-hashed password.
    pub password: Option<String>,
}
