//! Sharing policy configuration.

use serde::{Deserialize, Serialize};

/// Administrator policy applied when shares are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Whether public link shares may be created at all.
    #[serde(default = "default_true")]
    pub allow_links: bool,
    /// Whether link shares of folders may grant upload rights.
    #[serde(default = "default_true")]
    pub allow_public_upload: bool,
    /// Require a password on every link share.
    #[serde(default)]
    pub enforce_links_password: bool,
    /// Give link shares without an expiration a default one.
    #[serde(default)]
    pub default_expire_date: bool,
    /// Reject expirations further out than `expire_after_n_days`.
    #[serde(default)]
    pub enforce_expire_date: bool,
    /// Horizon used by the two expiration settings above.
    #[serde(default = "default_expire_days")]
    pub expire_after_n_days: i64,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            allow_links: true,
            allow_public_upload: true,
            enforce_links_password: false,
            default_expire_date: false,
            enforce_expire_date: false,
            expire_after_n_days: default_expire_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_expire_days() -> i64 {
    7
}
