//! Hook point definitions and payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cumulus_core::events::ShareEvent;

/// Enumeration of all hook points in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Fired after a share is created.
    PostShare,
    /// Fired before a share and its re-shares are deleted.
    PreUnshare,
    /// Fired once after a share and its re-shares were deleted.
    PostUnshare,
}

impl HookPoint {
    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostShare => "post_shared",
            Self::PreUnshare => "pre_unshare",
            Self::PostUnshare => "post_unshare",
        }
    }

    /// The hook point an event is fired at.
    pub fn for_event(event: &ShareEvent) -> Self {
        match event {
            ShareEvent::Shared { .. } => Self::PostShare,
            ShareEvent::PreUnshare { .. } => Self::PreUnshare,
            ShareEvent::PostUnshare { .. } => Self::PostUnshare,
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data handed to every handler of a hook point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookPayload {
    /// Hook point being fired.
    pub hook: HookPoint,
    /// The share event.
    pub event: ShareEvent,
    /// User that triggered the operation, if known.
    pub actor: Option<String>,
    /// When the hook was fired.
    pub timestamp: DateTime<Utc>,
}

impl HookPayload {
    /// Wrap an event, deriving its hook point.
    pub fn new(event: ShareEvent, actor: Option<String>) -> Self {
        Self {
            hook: HookPoint::for_event(&event),
            event,
            actor,
            timestamp: Utc::now(),
        }
    }
}
