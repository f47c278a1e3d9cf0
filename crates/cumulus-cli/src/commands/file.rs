//! File cache CLI commands: register nodes and list folders.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::repositories::{
    MountRepository, NodeRepository, ShareRepository, UserRepository,
};
use cumulus_entity::share::Permissions;
use cumulus_service::{NodeResolver, ResolvedNode, UserMountCache};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Register a file or folder in a user's home, creating parents
    Register {
        /// Owner
        uid: String,
        /// Path below the owner's home
        path: String,
        /// Register a folder instead of a file
        #[arg(long)]
        folder: bool,
        /// Permission bitmask of the owner
        #[arg(long, default_value_t = 31)]
        permissions: i32,
    },
    /// List a folder as seen by a user
    List {
        /// User
        uid: String,
        /// Folder path, the home root when omitted
        #[arg(default_value = "")]
        path: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct NodeRow {
    file_id: i64,
    path: String,
    item_type: String,
    owner: String,
    permissions: i32,
    shared: bool,
}

impl From<&ResolvedNode> for NodeRow {
    fn from(r: &ResolvedNode) -> Self {
        Self {
            file_id: r.node.file_id,
            path: r.node.user_path(),
            item_type: r.node.item_type().to_string(),
            owner: r.node.owner.clone(),
            permissions: r.permissions.bits(),
            shared: r.via_share.is_some(),
        }
    }
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let users = UserRepository::new(pool.clone());
    let mounts = Arc::new(UserMountCache::new(
        Arc::new(MountRepository::new(pool.clone())),
        config.dav.mount_cache_capacity,
    ));
    let resolver = NodeResolver::new(
        Arc::new(NodeRepository::new(pool.clone())),
        Arc::new(ShareRepository::new(pool)),
        mounts,
    );

    let (FileCommand::Register { uid, .. } | FileCommand::List { uid, .. }) = &args.command;
    if !users.exists(uid).await? {
        return Err(AppError::not_found(format!("User '{uid}' not found")));
    }

    match &args.command {
        FileCommand::Register {
            uid,
            path,
            folder,
            permissions,
        } => {
            let permissions = Permissions::from_bits(*permissions)
                .ok_or_else(|| AppError::validation("Permissions must be between 0 and 31"))?;
            let node = resolver.create(uid, path, *folder, permissions).await?;
            output::print_item(
                &NodeRow::from(&ResolvedNode {
                    permissions: node.permissions,
                    node,
                    via_share: None,
                }),
                format,
            );
        }
        FileCommand::List { uid, path } => {
            let folder = resolver
                .get(uid, path)
                .await?
                .ok_or_else(|| AppError::not_found(format!("'{path}' does not exist")))?;
            let rows: Vec<NodeRow> = resolver
                .children(&folder)
                .await?
                .iter()
                .map(NodeRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
