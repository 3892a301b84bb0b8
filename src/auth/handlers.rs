//! Authentication handlers

use axum::{
    extract::{rejection::QueryRejection, Extension, Json, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    AuthUrlResponse, LoginRequest, MessageResponse, OAuthCallbackParams, RegisterRequest,
    UpdateProfileRequest, User, UserResponse,
};
use super::services::{CredentialService, ProfileService};
use super::session::SessionManager;
use crate::common::{
    generate_state_token, safe_email_log, safe_token_log, ApiError, AppState, ValidJson,
};
use crate::services::google::GoogleError;

/// POST /api/auth/register
/// Creates a local account and signs the browser in
///
/// # Request Body
/// ```json
/// { "email": "alice@example.com", "password": "...", "first_name": "Alice" }
/// ```
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: SessionManager,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let user = CredentialService::new(state.db.clone())
        .register(request)
        .await?;
    session.create(user.id).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/auth/login
/// Verifies local credentials and signs the browser in
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: SessionManager,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = CredentialService::new(state.db.clone())
        .login(request)
        .await?;
    session.create(user.id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// POST /api/auth/logout
/// Destroys the session. Succeeds whether or not anyone was signed in.
pub async fn logout(session: SessionManager) -> Result<Json<MessageResponse>, ApiError> {
    session.destroy().await?;
    info!("User logout successful");

    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

/// GET /api/auth/user
/// Returns the signed-in user
pub async fn current_user(authed: AuthedUser) -> Json<UserResponse> {
    Json(UserResponse::from(authed.user))
}

/// PATCH /api/auth/profile
/// Updates first and/or last name
pub async fn update_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = ProfileService::new(state.db.clone())
        .update(authed.id(), request)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// GET /api/auth/google
/// Starts the Google OAuth flow: issues a state token bound to this session
/// and returns the consent URL for the browser to navigate to
///
/// # Response
/// ```json
/// { "auth_url": "https://accounts.google.com/o/oauth2/v2/auth?..." }
/// ```
pub async fn google_auth_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: SessionManager,
) -> Result<Json<AuthUrlResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let oauth_state = generate_state_token();
    let auth_url = state.identity_provider.authorization_url(&oauth_state)?;
    session.store_oauth_state(&oauth_state).await?;

    info!(state = %safe_token_log(&oauth_state), "Starting Google OAuth flow");
    Ok(Json(AuthUrlResponse { auth_url }))
}

/// Why a callback did not end in a signed-in session. Each maps to the
/// `error` value the front end reads from the redirect location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFailure {
    InvalidState,
    OAuthError,
    TokenError,
    MissingUserInfo,
    AccountConflict,
    ServerError,
}

impl CallbackFailure {
    pub fn code(self) -> &'static str {
        match self {
            CallbackFailure::InvalidState => "invalid_state",
            CallbackFailure::OAuthError => "oauth_error",
            CallbackFailure::TokenError => "token_error",
            CallbackFailure::MissingUserInfo => "missing_user_info",
            CallbackFailure::AccountConflict => "account_conflict",
            CallbackFailure::ServerError => "server_error",
        }
    }
}

/// A failed callback: the redirect code plus the error that caused it
#[derive(Debug)]
pub struct CallbackError {
    pub failure: CallbackFailure,
    pub cause: ApiError,
}

impl CallbackError {
    fn new(failure: CallbackFailure, cause: impl Into<ApiError>) -> Self {
        Self {
            failure,
            cause: cause.into(),
        }
    }
}

/// GET /auth/google/callback
/// Browser navigation back from Google. Always answers with a redirect: to
/// the app root on success, or to the login view with an `error` code. An
/// unparsable query string still consumes the pending state.
pub async fn google_oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: SessionManager,
    params: Result<Query<OAuthCallbackParams>, QueryRejection>,
) -> Redirect {
    let state = state_lock.read().await.clone();
    let params = params.map(|Query(params)| params);

    match complete_google_sign_in(&state, &session, params).await {
        Ok(user) => {
            info!(
                user_id = user.id,
                email = %safe_email_log(&user.email),
                provider = "google",
                "User authentication successful via Google OAuth"
            );
            Redirect::to(&state.config.app_root_url)
        }
        Err(err) => {
            let status = err.cause.status_code();
            if status.is_server_error() {
                error!(
                    code = err.failure.code(),
                    status = %status,
                    error = %err.cause,
                    "Google OAuth callback failed"
                );
            } else {
                warn!(
                    code = err.failure.code(),
                    status = %status,
                    error = %err.cause,
                    "Google OAuth callback rejected"
                );
            }
            Redirect::to(&state.config.login_error_url(err.failure.code()))
        }
    }
}

pub(crate) async fn complete_google_sign_in(
    state: &AppState,
    session: &SessionManager,
    params: Result<OAuthCallbackParams, QueryRejection>,
) -> Result<User, CallbackError> {
    // The issued state is single use whatever happens below
    let expected_state = session
        .take_oauth_state()
        .await
        .map_err(|e| CallbackError::new(CallbackFailure::ServerError, e))?;

    let params = params.map_err(|rejection| {
        CallbackError::new(
            CallbackFailure::OAuthError,
            ApiError::InvalidInput(rejection.body_text()),
        )
    })?;

    if let Some(provider_error) = &params.error {
        return Err(CallbackError::new(
            CallbackFailure::OAuthError,
            ApiError::InvalidInput(format!("provider returned error: {}", provider_error)),
        ));
    }

    match (&expected_state, &params.state) {
        (Some(expected), Some(received)) if expected == received => {
            debug!("OAuth state verified");
        }
        (expected, received) => {
            debug!(
                has_expected = expected.is_some(),
                has_received = received.is_some(),
                "OAuth state mismatch; rejecting callback"
            );
            return Err(CallbackError::new(
                CallbackFailure::InvalidState,
                ApiError::InvalidState,
            ));
        }
    }

    let code = params.code.as_deref().filter(|c| !c.is_empty()).ok_or_else(|| {
        CallbackError::new(
            CallbackFailure::OAuthError,
            ApiError::InvalidInput("no authorization code in callback".to_string()),
        )
    })?;

    let access_token = state
        .identity_provider
        .exchange_code(code)
        .await
        .map_err(|e| match e {
            GoogleError::NotConfigured => CallbackError::new(CallbackFailure::OAuthError, e),
            other => CallbackError::new(CallbackFailure::TokenError, other),
        })?;

    let profile = state
        .identity_provider
        .fetch_user_info(&access_token)
        .await
        .map_err(|e| CallbackError::new(CallbackFailure::MissingUserInfo, e))?;

    let user = CredentialService::new(state.db.clone())
        .resolve_or_create_user(&profile)
        .await
        .map_err(|e| match e {
            ApiError::Conflict(_) => CallbackError::new(CallbackFailure::AccountConflict, e),
            other => CallbackError::new(CallbackFailure::ServerError, other),
        })?;

    session
        .create(user.id)
        .await
        .map_err(|e| CallbackError::new(CallbackFailure::ServerError, e))?;

    Ok(user)
}
