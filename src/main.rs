// src/main.rs
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod app;
mod auth;
mod common;
mod logging_middleware;
mod services;
mod store;
mod tasks;


// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::{AppConfig, AppState};
use services::{GoogleService, IdentityProvider};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    info!(
        database_url = %config.database_url,
        app_root_url = %config.app_root_url,
        google_sign_in = config.google.is_configured(),
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    if config.reset_db {
        warn!("RESET_DB is set; dropping application tables");
    }
    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // SESSION STORE
    // ========================================================================

    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;
    // Expiry is enforced on every load; this only reclaims space
    if let Err(e) = session_store.delete_expired().await {
        warn!(error = %e, "Failed to purge expired sessions");
    }

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let google_service = GoogleService::new(config.google.clone())?;
    let identity_provider: Arc<dyn IdentityProvider> = Arc::new(google_service);
    info!("GoogleService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let config = Arc::new(config);
    let app_state = AppState {
        db: pool,
        config: config.clone(),
        identity_provider,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = app::build_router(shared, &config.cors_origins)
        .layer(app::session_layer(session_store, &config.session)?);

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
