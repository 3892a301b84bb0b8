//! Credential and profile services
//!
//! Local registration and login, resolution of a delegated identity to a
//! local account, and profile edits. Handlers call these after the request
//! body has been parsed; the session is handled by the caller.

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use super::models::{
    LoginRequest, NewUser, ProfilePatch, RegisterRequest, UpdateProfileRequest, User,
};
use crate::common::{safe_email_log, ApiError, Validator};
use crate::services::password::{
    dummy_password_hash, hash_password_blocking, verify_password_blocking, PasswordError,
};
use crate::services::ExternalProfile;
use crate::store::{StoreError, UserStore};

const EMAIL_TAKEN: &str = "An account with this email already exists";

pub struct CredentialService {
    users: UserStore,
}

impl CredentialService {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            users: UserStore::new(db),
        }
    }

    /// Create a `local` account. The email must not belong to any account.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        request.validate().into_result()?;

        let email = request.email.trim().to_string();
        match self.users.find_by_email(&email).await {
            Ok(_) => {
                warn!(email = %safe_email_log(&email), "Registration rejected: email taken");
                return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = hash_password_blocking(request.password)
            .await
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;

        // A concurrent registration can still win the race; the unique index
        // turns that into a Conflict here.
        let user = self
            .users
            .insert_user(&NewUser::local(
                email,
                password_hash,
                normalize_name(request.first_name),
                normalize_name(request.last_name),
            ))
            .await?;

        info!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            provider = "local",
            "New user account registered"
        );
        Ok(user)
    }

    /// Verify local credentials. Every failure mode returns the same
    /// `InvalidCredentials` error, and an unknown email or an account without
    /// a password still runs one Argon2 verification against a dummy hash.
    pub async fn login(&self, request: LoginRequest) -> Result<User, ApiError> {
        request.validate().into_result()?;

        let email = request.email.trim();
        let user = match self.users.find_by_email(email).await {
            Ok(user) => Some(user),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let stored_hash = user.as_ref().and_then(|u| u.password_hash.clone());
        let candidate_hash = match &stored_hash {
            Some(hash) => hash.clone(),
            None => dummy_password_hash()
                .await
                .map_err(|e| ApiError::InternalServer(e.to_string()))?,
        };

        let verified = verify_password_blocking(request.password, candidate_hash).await;

        let user = match (user, stored_hash) {
            (Some(user), Some(_)) => user,
            (Some(user), None) => {
                warn!(user_id = user.id, "Login failed: account has no local password");
                return Err(ApiError::InvalidCredentials);
            }
            (None, _) => {
                warn!(email = %safe_email_log(email), "Login failed: unknown email");
                return Err(ApiError::InvalidCredentials);
            }
        };

        match verified {
            Ok(true) => {
                info!(user_id = user.id, provider = "local", "User login successful");
                Ok(user)
            }
            Ok(false) => {
                warn!(user_id = user.id, "Login failed: wrong password");
                Err(ApiError::InvalidCredentials)
            }
            Err(PasswordError::MalformedHash(e)) => {
                error!(user_id = user.id, error = %e, "Stored password hash is unreadable");
                Err(ApiError::InvalidCredentials)
            }
            Err(e) => Err(ApiError::InternalServer(e.to_string())),
        }
    }

    /// Map a delegated identity to a local account: by Google id, then by
    /// verified email (linking the Google id onto it), else a new account.
    pub async fn resolve_or_create_user(&self, profile: &ExternalProfile) -> Result<User, ApiError> {
        match self.users.find_by_google_id(&profile.subject_id).await {
            Ok(user) => {
                info!(user_id = user.id, provider = "google", "Existing Google account signed in");
                return Ok(user);
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        match self.users.find_by_email(&profile.email).await {
            Ok(existing) => return self.link_existing(existing, profile).await,
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let new_user = NewUser::google(
            profile.email.clone(),
            profile.subject_id.clone(),
            normalize_name(profile.first_name.clone()),
            normalize_name(profile.last_name.clone()),
        );

        match self.users.insert_user(&new_user).await {
            Ok(user) => {
                info!(
                    user_id = user.id,
                    email = %safe_email_log(&user.email),
                    provider = "google",
                    "Creating new user account via Google OAuth"
                );
                Ok(user)
            }
            Err(StoreError::Conflict(msg)) => {
                // Another callback for the same identity inserted first
                warn!(conflict = %msg, "Concurrent Google sign-up; re-reading account");
                match self.users.find_by_google_id(&profile.subject_id).await {
                    Ok(user) => Ok(user),
                    Err(StoreError::NotFound) => Err(ApiError::Conflict(EMAIL_TAKEN.to_string())),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn link_existing(&self, existing: User, profile: &ExternalProfile) -> Result<User, ApiError> {
        if !profile.email_verified {
            warn!(
                user_id = existing.id,
                "Refusing to link Google account with unverified email"
            );
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }

        match self
            .users
            .link_google_account(
                existing.id,
                &profile.subject_id,
                profile.first_name.as_deref(),
                profile.last_name.as_deref(),
            )
            .await
        {
            Ok(user) => {
                info!(user_id = user.id, "Linked Google account to existing user");
                Ok(user)
            }
            Err(StoreError::NotFound) => Err(ApiError::Conflict(
                "This account is linked to a different Google identity".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct ProfileService {
    users: UserStore,
}

impl ProfileService {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            users: UserStore::new(db),
        }
    }

    /// Update name fields. A present empty string clears the field.
    pub async fn update(&self, user_id: i64, request: UpdateProfileRequest) -> Result<User, ApiError> {
        request.validate().into_result()?;

        let patch = ProfilePatch {
            first_name: request.first_name.map(|v| normalize_name(Some(v))),
            last_name: request.last_name.map(|v| normalize_name(Some(v))),
        };

        let user = self.users.update_profile(user_id, &patch).await?;
        info!(user_id, "Profile updated");
        Ok(user)
    }
}

/// Trim a name; blank becomes `None`
fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
