//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::migration;

/// `cumulus migrate`
#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show applied migrations
    Status,
    /// Reset database (drop all tables and re-run)
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    version: i64,
    description: String,
    success: bool,
}

pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            migration::run_migrations(&pool).await?;
            let applied = migration::migration_status(&pool).await?;
            output::print_success(&format!(
                "Schema at version {}",
                applied.last().map(|m| m.version).unwrap_or_default()
            ));
        }
        MigrateCommand::Status => {
            let rows: Vec<MigrationRow> = migration::migration_status(&pool)
                .await?
                .into_iter()
                .map(|m| MigrationRow {
                    version: m.version,
                    description: m.description,
                    success: m.success,
                })
                .collect();
            output::print_list(&rows, format);
        }
        MigrateCommand::Reset { force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt("Drop every share, comment, tag and property and rebuild the schema?")
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            migration::reset_database(&pool).await?;
            output::print_success("Schema rebuilt from scratch.");
        }
    }

    Ok(())
}
