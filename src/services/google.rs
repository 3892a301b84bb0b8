// src/services/google.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::common::config::GoogleConfig;

/// Scopes for sign-in only: stable subject id, email and names
const SIGN_IN_SCOPES: &str = "openid email profile";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("User info request failed: {0}")]
    UserInfo(String),
}

/// Identity returned by the delegated provider
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalProfile {
    pub subject_id: String,
    pub email: String,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Delegated identity provider reached through the authorization-code flow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the provider's consent page carrying `state`
    fn authorization_url(&self, state: &str) -> Result<String, GoogleError>;

    /// Server-to-server exchange of an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<String, GoogleError>;

    async fn fetch_user_info(&self, access_token: &str) -> Result<ExternalProfile, GoogleError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    verified_email: Option<bool>,
    given_name: Option<String>,
    family_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    config: GoogleConfig,
    client: Client,
}

impl GoogleService {
    /// Build the service with an HTTP client whose every request is bounded
    /// by `http_timeout_secs`.
    pub fn new(config: GoogleConfig) -> Result<Self, GoogleError> {
        let timeout = Duration::from_secs(config.http_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| GoogleError::InvalidConfig(e.to_string()))?;

        if config.is_configured() {
            info!(redirect_uri = %config.redirect_uri, "Google sign-in enabled");
        } else {
            warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set; Google sign-in disabled");
        }

        Ok(Self { config, client })
    }

    fn credentials(&self) -> Result<(&str, &str), GoogleError> {
        match (&self.config.client_id, &self.config.client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(GoogleError::NotConfigured),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleService {
    fn authorization_url(&self, state: &str) -> Result<String, GoogleError> {
        let (client_id, _) = self.credentials()?;

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=online&prompt=select_account",
            self.config.auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(SIGN_IN_SCOPES),
            urlencoding::encode(state)
        );

        debug!("Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    async fn exchange_code(&self, code: &str) -> Result<String, GoogleError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timed_out = e.is_timeout(), "Token endpoint unreachable");
                GoogleError::TokenExchange(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::TokenExchange(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::TokenExchange(e.to_string()))?;

        debug!(
            expires_in = ?token_response.expires_in,
            scope = ?token_response.scope,
            "Authorization code exchanged"
        );
        Ok(token_response.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<ExternalProfile, GoogleError> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timed_out = e.is_timeout(), "User info endpoint unreachable");
                GoogleError::UserInfo(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "User info request rejected");
            return Err(GoogleError::UserInfo(format!("HTTP {}", status)));
        }

        let info = response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| GoogleError::UserInfo(e.to_string()))?;

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| GoogleError::UserInfo("profile has no email".to_string()))?;

        Ok(ExternalProfile {
            subject_id: info.id,
            email,
            email_verified: info.verified_email.unwrap_or(false),
            first_name: info.given_name,
            last_name: info.family_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Form,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    fn configured(base: &str) -> GoogleConfig {
        GoogleConfig {
            client_id: Some("test_client_id".to_string()),
            client_secret: Some("test_secret".to_string()),
            redirect_uri: "http://localhost:8080/auth/google/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: format!("{}/token", base),
            userinfo_url: format!("{}/userinfo", base),
            http_timeout_secs: 5,
        }
    }

    /// Local stand-in for Google's token and user-info endpoints
    async fn spawn_fake_google() -> String {
        async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<serde_json::Value>) {
            if form.get("code").map(String::as_str) == Some("good-code")
                && form.get("client_secret").map(String::as_str) == Some("test_secret")
                && form.get("grant_type").map(String::as_str) == Some("authorization_code")
            {
                (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "access_token": "access-123",
                        "expires_in": 3599,
                        "token_type": "Bearer",
                        "scope": "openid email profile"
                    })),
                )
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": "invalid_grant" })),
                )
            }
        }

        async fn userinfo(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            match auth {
                "Bearer access-123" => (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "id": "10769150350006150715113082367",
                        "email": "alice@example.com",
                        "verified_email": true,
                        "given_name": "Alice",
                        "family_name": "Liddell"
                    })),
                ),
                "Bearer no-email" => (
                    StatusCode::OK,
                    Json(serde_json::json!({ "id": "42" })),
                ),
                _ => (StatusCode::UNAUTHORIZED, Json(serde_json::json!({}))),
            }
        }

        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_authorization_url_not_configured() {
        let service = GoogleService::new(GoogleConfig::default()).unwrap();
        assert!(matches!(
            service.authorization_url("state"),
            Err(GoogleError::NotConfigured)
        ));
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let service = GoogleService::new(configured("http://unused")).unwrap();
        let auth_url = service.authorization_url("abc123").unwrap();

        assert!(auth_url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(auth_url.contains("client_id=test_client_id"));
        assert!(auth_url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgoogle%2Fcallback"));
        assert!(auth_url.contains("response_type=code"));
        assert!(auth_url.contains("scope=openid%20email%20profile"));
        assert!(auth_url.contains("state=abc123"));
        assert!(!auth_url.contains("test_secret"));
    }

    #[tokio::test]
    async fn test_exchange_and_fetch_profile() {
        let base = spawn_fake_google().await;
        let service = GoogleService::new(configured(&base)).unwrap();

        let token = service.exchange_code("good-code").await.unwrap();
        assert_eq!(token, "access-123");

        let profile = service.fetch_user_info(&token).await.unwrap();
        assert_eq!(
            profile,
            ExternalProfile {
                subject_id: "10769150350006150715113082367".to_string(),
                email: "alice@example.com".to_string(),
                email_verified: true,
                first_name: Some("Alice".to_string()),
                last_name: Some("Liddell".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_rejected_code_is_token_exchange_error() {
        let base = spawn_fake_google().await;
        let service = GoogleService::new(configured(&base)).unwrap();

        assert!(matches!(
            service.exchange_code("bad-code").await,
            Err(GoogleError::TokenExchange(msg)) if msg.contains("400")
        ));
    }

    #[tokio::test]
    async fn test_user_info_errors() {
        let base = spawn_fake_google().await;
        let service = GoogleService::new(configured(&base)).unwrap();

        assert!(matches!(
            service.fetch_user_info("expired").await,
            Err(GoogleError::UserInfo(_))
        ));
        assert!(matches!(
            service.fetch_user_info("no-email").await,
            Err(GoogleError::UserInfo(msg)) if msg.contains("no email")
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_token_exchange_error() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = GoogleService::new(configured(&format!("http://{}", addr))).unwrap();
        assert!(matches!(
            service.exchange_code("good-code").await,
            Err(GoogleError::TokenExchange(_))
        ));
    }
}
