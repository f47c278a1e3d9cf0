//! Who may see or delete a share.

use std::sync::Arc;

use cumulus_core::result::AppResult;
use cumulus_database::repositories::GroupRepository;
use cumulus_entity::share::{Share, ShareType};

/// Decides whether a user may access a share.
#[derive(Debug, Clone)]
pub struct ShareAccess {
    groups: Arc<GroupRepository>,
}

impl ShareAccess {
    /// Creates a new access checker.
    pub fn new(groups: Arc<GroupRepository>) -> Self {
        Self { groups }
    }

    /// The owner of the node and the sharer always have access, as do the
    /// recipient of a user share and members of a group share's group.
    pub async fn can_access(&self, share: &Share, uid: &str) -> AppResult<bool> {
        if share.share_owner() == uid || share.shared_by() == uid {
            return Ok(true);
        }
        match (share.share_type, share.share_with.as_deref()) {
            (ShareType::User, Some(with)) => Ok(with == uid),
            (ShareType::Group, Some(gid)) => self.groups.is_member(gid, uid).await,
            _ => Ok(false),
        }
    }
}
