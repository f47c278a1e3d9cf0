//! Handlers registered by default.

use async_trait::async_trait;
use tracing::info;

use cumulus_core::events::ShareEvent;
use cumulus_core::result::AppResult;

use super::definitions::{HookPayload, HookPoint};
use super::registry::HookHandler;

/// Writes every share hook to the log as a structured audit record.
#[derive(Debug, Default)]
pub struct AuditLogHandler;

impl AuditLogHandler {
    /// Hook points this handler listens on.
    pub const HOOKS: [HookPoint; 3] =
        [HookPoint::PostShare, HookPoint::PreUnshare, HookPoint::PostUnshare];
}

#[async_trait]
impl HookHandler for AuditLogHandler {
    async fn handle(&self, payload: &HookPayload) -> AppResult<()> {
        let share = payload.event.share();
        let deleted = match &payload.event {
            ShareEvent::PostUnshare { deleted_shares, .. } => deleted_shares.len(),
            _ => 0,
        };
        info!(
            target: "cumulus::audit",
            hook = %payload.hook,
            actor = payload.actor.as_deref().unwrap_or(""),
            share_id = share.id,
            share_type = share.share_type,
            share_with = %share.share_with,
            uid_owner = %share.uid_owner,
            file_target = %share.file_target,
            deleted,
            "Share hook"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "audit_log"
    }

    fn priority(&self) -> i32 {
        1000
    }
}
