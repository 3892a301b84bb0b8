//! Authentication routes

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/register` - Local account registration
/// - `POST /api/auth/login` - Local credential login
/// - `POST /api/auth/logout` - Destroy the session
/// - `GET /api/auth/user` - Current user
/// - `PATCH /api/auth/profile` - Update name fields
/// - `GET /api/auth/google` - Start Google OAuth, returns `{auth_url}`
/// - `GET /auth/google/callback` - Google OAuth redirect target
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/user", get(handlers::current_user))
        .route("/api/auth/profile", patch(handlers::update_profile))
        .route("/api/auth/google", get(handlers::google_auth_start))
        .route("/auth/google/callback", get(handlers::google_oauth_callback))
}
