//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::User;
use super::session::SessionManager;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::store::{StoreError, UserStore};

/// Authenticated user extractor
///
/// The single place a handler learns who is calling. It resolves the
/// session's user id against the store; a session without a user, or whose
/// user no longer exists, is rejected with 401 before the handler runs. A
/// stale binding is flushed on the way out.
#[derive(Debug)]
pub struct AuthedUser {
    pub user: User,
    pub session: SessionManager,
}

impl AuthedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let db = state_lock.read().await.db.clone();
        let session = SessionManager::from_request_parts(parts, state).await?;

        let user_id = match session.current_user_id().await? {
            Some(id) => id,
            None => {
                debug!("Authentication failed: no user bound to session");
                return Err(ApiError::Unauthenticated("Authentication required".into()));
            }
        };

        match UserStore::new(db).find_by_id(user_id).await {
            Ok(user) => {
                debug!(
                    user_id = user.id,
                    email = %safe_email_log(&user.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser { user, session })
            }
            Err(StoreError::NotFound) => {
                warn!(user_id, "Session references a missing user; clearing it");
                session.destroy().await?;
                Err(ApiError::Unauthenticated("Authentication required".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
