//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which credential path owns an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Google,
}

/// User database model
///
/// Not `Serialize`: responses go through [`UserResponse`], which leaves out
/// the password hash and the Google subject id.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub auth_provider: AuthProvider,
    pub google_id: Option<String>,
    pub created_at: String,
}

/// Row to insert into `users`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub auth_provider: AuthProvider,
    pub google_id: Option<String>,
}

impl NewUser {
    pub fn local(
        email: String,
        password_hash: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            email,
            password_hash: Some(password_hash),
            first_name,
            last_name,
            auth_provider: AuthProvider::Local,
            google_id: None,
        }
    }

    pub fn google(
        email: String,
        google_id: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            email,
            password_hash: None,
            first_name,
            last_name,
            auth_provider: AuthProvider::Google,
            google_id: Some(google_id),
        }
    }
}

/// Profile columns to change. The outer `Option` says whether the column is
/// touched, the inner one is the new value (`None` clears it).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfilePatch {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

// ---- Request bodies ----

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Query string of the OAuth redirect back from the provider
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// ---- Response bodies ----

/// Public view of a user
#[derive(Serialize, Debug, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub auth_provider: AuthProvider,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            auth_provider: user.auth_provider,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            auth_provider: user.auth_provider,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
