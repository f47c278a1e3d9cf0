//! Group management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::repositories::{GroupRepository, UserRepository};
use cumulus_service::AccountService;

/// Arguments for group commands
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Group subcommand
    #[command(subcommand)]
    pub command: GroupCommand,
}

/// Group subcommands
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Create a group
    Add {
        /// Group id
        gid: String,
        /// Display name
        #[arg(short, long)]
        display_name: Option<String>,
    },
    /// List groups
    List,
    /// Add a user to a group
    AddMember {
        /// Group id
        gid: String,
        /// User id
        uid: String,
    },
    /// Remove a user from a group
    RemoveMember {
        /// Group id
        gid: String,
        /// User id
        uid: String,
    },
    /// List the members of a group
    Members {
        /// Group id
        gid: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct GroupRow {
    gid: String,
    display_name: String,
}

#[derive(Debug, Serialize, Tabled)]
struct MemberRow {
    uid: String,
}

/// Execute group commands
pub async fn execute(
    args: &GroupArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let accounts = AccountService::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(GroupRepository::new(pool)),
    );

    match &args.command {
        GroupCommand::Add { gid, display_name } => {
            let group = accounts.create_group(gid, display_name.as_deref()).await?;
            output::print_item(
                &GroupRow {
                    gid: group.gid,
                    display_name: group.display_name,
                },
                format,
            );
        }
        GroupCommand::List => {
            let rows: Vec<GroupRow> = accounts
                .list_groups()
                .await?
                .into_iter()
                .map(|g| GroupRow {
                    gid: g.gid,
                    display_name: g.display_name,
                })
                .collect();
            output::print_list(&rows, format);
        }
        GroupCommand::AddMember { gid, uid } => {
            accounts.add_to_group(gid, uid).await?;
            output::print_success(&format!("Added '{uid}' to '{gid}'"));
        }
        GroupCommand::RemoveMember { gid, uid } => {
            if accounts.remove_from_group(gid, uid).await? {
                output::print_success(&format!("Removed '{uid}' from '{gid}'"));
            } else {
                println!("'{uid}' is not a member of '{gid}'.");
            }
        }
        GroupCommand::Members { gid } => {
            let rows: Vec<MemberRow> = accounts
                .group_members(gid)
                .await?
                .into_iter()
                .map(|uid| MemberRow { uid })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
