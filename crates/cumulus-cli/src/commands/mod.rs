//! CLI command definitions and dispatch.

pub mod comment;
pub mod dav;
pub mod file;
pub mod group;
pub mod migrate;
pub mod mount;
pub mod serve;
pub mod tag;
pub mod user;

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use crate::output::OutputFormat;
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::DatabasePool;

/// Cumulus: file sharing, comments, tags and contacts administration
#[derive(Debug, Parser)]
#[command(name = "cumulus", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml` overlay)
    #[arg(short, long, env = "CUMULUS_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
    /// Group management
    Group(group::GroupArgs),
    /// File cache management
    File(file::FileArgs),
    /// System tag management
    Tag(tag::TagArgs),
    /// Cached mounts
    Mount(mount::MountArgs),
    /// Comments
    Comment(comment::CommentArgs),
    /// DAV maintenance
    Dav(dav::DavArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Group(args) => group::execute(args, &config, self.format).await,
            Commands::File(args) => file::execute(args, &config, self.format).await,
            Commands::Tag(args) => tag::execute(args, &config, self.format).await,
            Commands::Mount(args) => mount::execute(args, &config, self.format).await,
            Commands::Comment(args) => comment::execute(args, &config, self.format).await,
            Commands::Dav(args) => dav::execute(args, &config).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<SqlitePool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
