//! Cumulus server entry point.
//!
//! Loads configuration, initialises logging, opens the database and
//! serves the HTTP API until Ctrl+C.

use tracing_subscriber::{EnvFilter, fmt};

use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `CUMULUS_ENV`
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CUMULUS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Cumulus v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    if config.database.migrate_on_start {
        cumulus_database::migration::run_migrations(db.pool()).await?;
    }

    cumulus_api::run_server(config, db.into_pool()).await
}
