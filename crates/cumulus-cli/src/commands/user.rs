//! User management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_core::types::pagination::PageRequest;
use cumulus_database::repositories::{GroupRepository, UserRepository};
use cumulus_entity::user::{CreateUser, User};
use cumulus_service::AccountService;

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Add {
        /// Login name
        uid: String,
        /// Display name
        #[arg(short, long)]
        display_name: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// User backend name
        #[arg(long, default_value = "Database")]
        backend: String,
        /// Avatar image file
        #[arg(long, requires = "avatar_mime")]
        avatar: Option<String>,
        /// MIME type of the avatar image
        #[arg(long)]
        avatar_mime: Option<String>,
    },
    /// List users
    List {
        /// Maximum number of users, 0 for all
        #[arg(long, default_value_t = 0)]
        limit: u64,
        /// Number of users to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Change a user's display name
    Rename {
        /// Login name
        uid: String,
        /// New display name
        display_name: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    uid: String,
    display_name: String,
    backend: String,
    email: String,
    avatar: bool,
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            uid: u.uid.clone(),
            display_name: u.display_name.clone(),
            backend: u.backend.clone(),
            email: u.email.clone().unwrap_or_default(),
            avatar: u.avatar().is_some(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let accounts = AccountService::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(GroupRepository::new(pool)),
    );

    match &args.command {
        UserCommand::Add {
            uid,
            display_name,
            email,
            backend,
            avatar,
            avatar_mime,
        } => {
            let avatar = match (avatar, avatar_mime) {
                (Some(path), Some(mime)) => Some((mime.clone(), tokio::fs::read(path).await?)),
                _ => None,
            };
            let user = accounts
                .create_user(CreateUser {
                    uid: uid.clone(),
                    display_name: display_name.clone().unwrap_or_default(),
                    backend: backend.clone(),
                    email: email.clone(),
                    avatar,
                })
                .await?;
            output::print_item(&UserRow::from(&user), format);
        }
        UserCommand::List { limit, offset } => {
            let page = accounts.list_users(PageRequest::new(*limit, *offset)).await?;
            let rows: Vec<UserRow> = page.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            if page.has_more() {
                output::print_kv("total", &page.total.to_string());
            }
        }
        UserCommand::Rename { uid, display_name } => {
            accounts.set_display_name(uid, display_name).await?;
            output::print_success(&format!("User '{uid}' renamed to '{display_name}'"));
        }
    }

    Ok(())
}
