pub mod access;
pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod core_state;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod notification;
pub mod reports;
pub mod triage;
pub mod users;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServerConfig};
use crate::core_state::CoreState;
use crate::db::DatabaseError;
use crate::notification::LogNotifier;
use crate::users::UserError;

/// Fatal errors while bringing the service up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Bootstrap account error: {0}")]
    Bootstrap(#[from] UserError),

    #[error("Server error: {0}")]
    Server(String),
}

/// Run the dispatch server until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = ServerConfig::from_env()?;
    tracing::info!(db = %settings.database_path.display(), "Opening database");

    let core = Arc::new(CoreState::open(
        &settings.database_path,
        Arc::new(LogNotifier),
    )?);

    match &settings.bootstrap {
        Some(admin) => {
            if core.ensure_bootstrap_admin(admin)?.is_none() {
                tracing::info!("Users already exist, bootstrap account skipped");
            }
        }
        None if core.store().user_count()? == 0 => {
            tracing::warn!(
                "No users exist; set DISPATCH_BOOTSTRAP_EMAIL and DISPATCH_BOOTSTRAP_PASSWORD"
            );
        }
        None => {}
    }

    let server = api::start_api_server(core, settings.bind, settings.port)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(addr = %server.session.server_addr, "Dispatch API ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    tracing::info!("Shutting down gracefully");
    server.stop().await;

    Ok(())
}
