//! Session manager: binds a browser session to a user id
//!
//! The session id travels in an HTTP-only cookie; the record itself lives in
//! whichever `tower_sessions` store the router was built with.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::fmt;
use tower_sessions::Session;
use tracing::{debug, error};

use crate::common::ApiError;

/// Key for storing the authenticated user id in the session
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Key for the one-time OAuth state issued by `GET /api/auth/google`
pub const SESSION_OAUTH_STATE_KEY: &str = "oauth_state";

#[derive(Clone)]
pub struct SessionManager {
    session: Session,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_id", &self.session.id())
            .finish()
    }
}

impl SessionManager {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Bind `user_id` to this browser. The session id is rotated first so an
    /// id issued before login cannot be reused afterwards.
    pub async fn create(&self, user_id: i64) -> Result<(), ApiError> {
        self.session.cycle_id().await?;
        self.session.insert(SESSION_USER_ID_KEY, user_id).await?;
        debug!(user_id, "Session bound to user");
        Ok(())
    }

    pub async fn current_user_id(&self) -> Result<Option<i64>, ApiError> {
        Ok(self.session.get::<i64>(SESSION_USER_ID_KEY).await?)
    }

    /// Drop the whole session, record and cookie
    pub async fn destroy(&self) -> Result<(), ApiError> {
        self.session.flush().await?;
        Ok(())
    }

    pub async fn store_oauth_state(&self, state: &str) -> Result<(), ApiError> {
        self.session
            .insert(SESSION_OAUTH_STATE_KEY, state.to_string())
            .await?;
        Ok(())
    }

    /// Remove and return the pending OAuth state; a second call yields `None`
    pub async fn take_oauth_state(&self) -> Result<Option<String>, ApiError> {
        Ok(self.session.remove::<String>(SESSION_OAUTH_STATE_KEY).await?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionManager
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                error!("Session layer missing from router");
                ApiError::InternalServer("session layer missing".to_string())
            })?;

        Ok(Self::new(session))
    }
}
