//! Share request parameters and the formatted share returned by OCS.

use serde::{Deserialize, Serialize};

/// A parameter value that may arrive as a JSON number, a JSON boolean or
/// a form string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// JSON integer.
    Int(i64),
    /// JSON boolean.
    Bool(bool),
    /// Form or JSON string.
    Text(String),
}

impl Scalar {
    /// The value as a string.
    pub fn as_text(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Text(v) => v.clone(),
        }
    }

    /// The value as an integer, when it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(_) => None,
            Self::Text(v) => v.trim().parse().ok(),
        }
    }

    /// Whether the value is `true` or the string `"true"`.
    pub fn is_true(&self) -> bool {
        match self {
            Self::Bool(v) => *v,
            Self::Int(_) => false,
            Self::Text(v) => v == "true",
        }
    }
}

/// Parameters of `POST /shares`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareParams {
    /// Path of the node in the caller's tree.
    pub path: Option<Scalar>,
    /// Requested permission bitmask.
    pub permissions: Option<Scalar>,
    /// Share type code.
    pub share_type: Option<Scalar>,
    /// Recipient.
    pub share_with: Option<Scalar>,
    /// `"true"` to allow uploads into a shared folder link.
    pub public_upload: Option<Scalar>,
    /// Link password.
    pub password: Option<Scalar>,
    /// Link expiration, `YYYY-MM-DD`.
    pub expire_date: Option<Scalar>,
}

impl CreateShareParams {
    /// A parameter's text, treating empty strings as absent.
    pub fn text(value: &Option<Scalar>) -> Option<String> {
        value.as_ref().map(Scalar::as_text).filter(|v| !v.is_empty())
    }
}

/// A share as rendered by the OCS API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareData {
    pub id: i64,
    pub share_type: i32,
    pub uid_owner: String,
    pub displayname_owner: String,
    pub uid_file_owner: String,
    pub displayname_file_owner: String,
    pub permissions: i32,
    pub stime: i64,
    pub parent: Option<i64>,
    /// `Y-m-d 00:00:00`.
    pub expiration: Option<String>,
    pub token: Option<String>,
    pub path: Option<String>,
    pub item_type: String,
    pub storage_id: Option<String>,
    pub storage: Option<i64>,
    pub item_source: i64,
    pub file_source: i64,
    pub file_parent: Option<i64>,
    pub file_target: String,
    pub share_with: Option<String>,
    pub share_with_displayname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub mail_send: i32,
}
