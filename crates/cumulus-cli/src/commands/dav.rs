//! DAV maintenance commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use crate::output;
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::repositories::{CardDavRepository, UserRepository};
use cumulus_service::AddressBookSync;

/// Arguments for dav commands
#[derive(Debug, Args)]
pub struct DavArgs {
    /// Dav subcommand
    #[command(subcommand)]
    pub command: DavCommand,
}

/// Dav subcommands
#[derive(Debug, Subcommand)]
pub enum DavCommand {
    /// Write a contact card for every user into the system address book
    SyncSystemAddressbook,
}

/// Execute dav commands
pub async fn execute(args: &DavArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let sync = AddressBookSync::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(CardDavRepository::new(pool)),
    );

    match &args.command {
        DavCommand::SyncSystemAddressbook => {
            println!("Syncing users ...");
            let mut seen = 0u64;
            let report = sync
                .sync_system_address_book(|user| {
                    seen += 1;
                    tracing::debug!(uid = %user.uid, "Synced user");
                    if seen % 50 == 0 {
                        println!("  {seen} users");
                    }
                })
                .await?;
            output::print_kv("created", &report.created.to_string());
            output::print_kv("updated", &report.updated.to_string());
            output::print_kv("unchanged", &report.unchanged.to_string());
            output::print_success(&format!("Synced {} users", report.total()));
        }
    }

    Ok(())
}
