//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod dav;
pub mod logging;
pub mod sharing;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::database::DatabaseConfig;
pub use self::dav::DavConfig;
pub use self::logging::LoggingConfig;
pub use self::sharing::SharingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File sharing policy.
    #[serde(default)]
    pub sharing: SharingConfig,
    /// WebDAV surface settings.
    #[serde(default)]
    pub dav: DavConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CUMULUS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CUMULUS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable_without_files() {
        let config: AppConfig = config::Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("empty config deserializes");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite://data/cumulus.db?mode=rwc");
        assert!(config.sharing.allow_links);
        assert_eq!(config.sharing.expire_after_n_days, 7);
        assert_eq!(config.dav.user_header, "x-remote-user");
    }

    #[test]
    fn test_overrides_from_source() {
        let config: AppConfig = config::Config::builder()
            .set_override("sharing.enforce_links_password", true)
            .and_then(|b| b.set_override("server.public_url", "https://cloud.example.com"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("overrides apply");
        assert!(config.sharing.enforce_links_password);
        assert_eq!(config.server.public_url, "https://cloud.example.com");
    }
}
