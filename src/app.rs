// src/app.rs
//! Router composition shared by the binary and the HTTP tests

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer, SessionStore};
use tracing::warn;

use crate::common::config::SessionConfig;
use crate::common::AppState;
use crate::{auth, logging_middleware, tasks};

/// All routes with the shared state and cross-cutting layers. The session
/// layer is applied by the caller so tests can swap in an in-memory store.
pub fn build_router(shared: Arc<RwLock<AppState>>, cors_origins: &[String]) -> Router {
    Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // TASK ROUTES
        // ====================================================================
        .merge(tasks::tasks_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Cookie session layer: HTTP-only cookie, `SameSite=Lax` so the OAuth
/// redirect back from Google still carries it, expiry refreshed on activity.
pub fn session_layer<Store: SessionStore>(
    store: Store,
    config: &SessionConfig,
) -> anyhow::Result<SessionManagerLayer<Store>> {
    let inactivity = Duration::from_secs(config.expiry_days.max(1) * 24 * 60 * 60);

    Ok(SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_http_only(true)
        .with_secure(config.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(inactivity.try_into()?)))
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
