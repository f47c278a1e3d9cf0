//! WebDAV and mount cache configuration.

use serde::{Deserialize, Serialize};

/// Settings for the DAV surface and the per-user mount cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DavConfig {
    /// Header carrying the already-authenticated user id.
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// Maximum number of users whose mounts are kept in memory.
    #[serde(default = "default_mount_cache_capacity")]
    pub mount_cache_capacity: u64,
}

impl Default for DavConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
            mount_cache_capacity: default_mount_cache_capacity(),
        }
    }
}

fn default_user_header() -> String {
    "x-remote-user".to_string()
}

fn default_mount_cache_capacity() -> u64 {
    10_000
}
