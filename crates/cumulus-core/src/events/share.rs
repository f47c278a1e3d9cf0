//! Share-related domain events.

use serde::{Deserialize, Serialize};

/// Description of a single share as seen by share hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareHookParams {
    /// Share id.
    pub id: i64,
    /// `"file"` or `"folder"`.
    pub item_type: String,
    /// File id of the shared node.
    pub item_source: i64,
    /// Numeric share type.
    pub share_type: i32,
    /// Recipient uid, gid or remote address; empty for links.
    pub share_with: String,
    /// Parent share id for re-shares.
    #[serde(rename = "itemparent")]
    pub item_parent: Option<i64>,
    /// The user who created the share.
    pub uid_owner: String,
    /// File id of the shared node.
    pub file_source: i64,
    /// Target path in the recipient's tree.
    pub file_target: String,
}

/// Events related to sharing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A share was created.
    Shared {
        /// The new share.
        share: ShareHookParams,
    },
    /// A share and its re-shares are about to be deleted.
    PreUnshare {
        /// The share being deleted.
        share: ShareHookParams,
    },
    /// A share and its re-shares were deleted.
    PostUnshare {
        /// The share that was deleted.
        share: ShareHookParams,
        /// Every deleted share in deletion order, the root last.
        #[serde(rename = "deletedShares")]
        deleted_shares: Vec<ShareHookParams>,
    },
}

impl ShareEvent {
    /// The share the event is about.
    pub fn share(&self) -> &ShareHookParams {
        match self {
            Self::Shared { share } | Self::PreUnshare { share } | Self::PostUnshare { share, .. } => {
                share
            }
        }
    }
}
