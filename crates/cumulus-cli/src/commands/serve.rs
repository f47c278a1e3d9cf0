//! Start the Cumulus server.

use clap::Args;

use crate::output;
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip database migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Apply the overrides, migrate unless told not to, then serve until Ctrl+C.
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    let base = config.server.public_url.trim_end_matches('/').to_string();
    output::print_kv("Listening on", &format!("{}:{}", config.server.host, config.server.port));
    output::print_kv("Share API", &format!("{base}/ocs/v2.php/apps/files_sharing/api/v1/shares"));
    output::print_kv("WebDAV", &format!("{base}/remote.php/dav/files/<user>/"));

    let pool = super::create_db_pool(&config).await?;

    if config.database.migrate_on_start && !args.no_migrate {
        cumulus_database::migration::run_migrations(&pool).await?;
        output::print_kv("Migrations", "up to date");
    }

    cumulus_api::run_server(config, pool).await
}
