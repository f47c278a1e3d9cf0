//! Cached mount inspection.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::repositories::MountRepository;
use cumulus_entity::mount::CachedMountInfo;
use cumulus_service::UserMountCache;

/// Arguments for mount commands
#[derive(Debug, Args)]
pub struct MountArgs {
    /// Mount subcommand
    #[command(subcommand)]
    pub command: MountCommand,
}

/// Mount subcommands
#[derive(Debug, Subcommand)]
pub enum MountCommand {
    /// Mounts of a user
    User {
        /// User id
        uid: String,
    },
    /// Mounts of a storage
    Storage {
        /// Numeric storage id
        storage_id: i64,
    },
    /// Mounts with a given root node
    Root {
        /// File id of the mount root
        root_id: i64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct MountRow {
    user_id: String,
    storage_id: i64,
    root_id: i64,
    mount_point: String,
}

impl From<&CachedMountInfo> for MountRow {
    fn from(m: &CachedMountInfo) -> Self {
        Self {
            user_id: m.user_id.clone(),
            storage_id: m.storage_id,
            root_id: m.root_id,
            mount_point: m.mount_point.clone(),
        }
    }
}

/// Execute mount commands
pub async fn execute(
    args: &MountArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let cache = UserMountCache::new(
        Arc::new(MountRepository::new(pool)),
        config.dav.mount_cache_capacity,
    );

    let rows: Vec<MountRow> = match &args.command {
        MountCommand::User { uid } => cache
            .get_mounts_for_user(uid)
            .await?
            .iter()
            .map(MountRow::from)
            .collect(),
        MountCommand::Storage { storage_id } => cache
            .get_mounts_for_storage_id(*storage_id)
            .await?
            .iter()
            .map(MountRow::from)
            .collect(),
        MountCommand::Root { root_id } => cache
            .get_mounts_for_root_id(*root_id)
            .await?
            .iter()
            .map(MountRow::from)
            .collect(),
    };
    output::print_list(&rows, format);

    Ok(())
}
