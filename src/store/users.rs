use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::StoreError;
use crate::auth::models::{NewUser, ProfilePatch, User};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, auth_provider, google_id, created_at";

#[derive(Clone)]
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a user. A duplicate email or Google id yields `Conflict`.
    pub async fn insert_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, auth_provider, google_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.auth_provider)
        .bind(&new_user.google_id)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(msg) if msg.contains("users.email") => {
                StoreError::Conflict("An account with this email already exists".to_string())
            }
            StoreError::Conflict(msg) if msg.contains("users.google_id") => {
                StoreError::Conflict("This Google account is already linked".to_string())
            }
            other => other,
        })?;

        debug!(user_id = user.id, provider = ?user.auth_provider, "Inserted user");
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Exact-match lookup; emails are not case folded
    pub async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    pub async fn find_by_google_id(&self, google_id: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = ?"
        ))
        .bind(google_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Apply a profile patch in one statement. Only name columns are
    /// updatable.
    pub async fn update_profile(&self, id: i64, patch: &ProfilePatch) -> Result<User, StoreError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name = CASE WHEN ? THEN ? ELSE first_name END,
                last_name = CASE WHEN ? THEN ? ELSE last_name END
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(patch.first_name.is_some())
        .bind(patch.first_name.clone().flatten())
        .bind(patch.last_name.is_some())
        .bind(patch.last_name.clone().flatten())
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Attach a Google subject id to an account that has none yet and switch
    /// it to the `google` provider. Existing names are kept; missing ones are
    /// filled from the provider profile. `NotFound` when the user is absent or
    /// already linked.
    pub async fn link_google_account(
        &self,
        id: i64,
        google_id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                auth_provider = 'google',
                google_id = ?,
                first_name = COALESCE(first_name, ?),
                last_name = COALESCE(last_name, ?)
            WHERE id = ? AND google_id IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(google_id)
        .bind(first_name)
        .bind(last_name)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}
