// src/common/config.rs
//! Application configuration loaded from environment variables

use std::env;

/// Google OAuth client settings. Sign-in with Google is disabled unless both
/// the client id and secret are present.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub http_timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:8080/auth/google/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl GoogleConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
    pub expiry_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "taskboard.sid".to_string(),
            secure: false,
            expiry_days: 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Where the browser lands after the OAuth callback. Always ends with `/`.
    pub app_root_url: String,
    pub reset_db: bool,
    pub session: SessionConfig,
    pub google: GoogleConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://taskboard.db".to_string(),
            port: 8080,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            app_root_url: "/".to_string(),
            reset_db: false,
            session: SessionConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = split_list(&origins);
        }

        if let Ok(root) = env::var("APP_ROOT_URL") {
            config.app_root_url = normalize_root(&root);
        }

        config.reset_db = env_flag("RESET_DB", false);

        // SESSION_* - cookie behaviour
        config.session.secure = env_flag("SESSION_SECURE_COOKIE", config.session.secure);
        if let Some(days) = env::var("SESSION_EXPIRY_DAYS")
            .ok()
            .and_then(|d| d.parse::<u64>().ok())
        {
            config.session.expiry_days = days;
        }

        // GOOGLE_* - OAuth client
        config.google.client_id = env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty());
        config.google.client_secret = env::var("GOOGLE_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty());
        if let Ok(uri) = env::var("GOOGLE_OAUTH_REDIRECT_URI") {
            config.google.redirect_uri = uri;
        }
        if let Some(secs) = env::var("GOOGLE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.google.http_timeout_secs = secs;
        }

        config
    }

    /// Browser location for a failed OAuth callback, read by the front end
    /// from the URL fragment.
    pub fn login_error_url(&self, code: &str) -> String {
        format!(
            "{}#/login?error={}",
            self.app_root_url,
            urlencoding::encode(code)
        )
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_root(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_root_appends_slash() {
        assert_eq!(normalize_root("http://localhost:3000"), "http://localhost:3000/");
        assert_eq!(normalize_root("http://localhost:3000/"), "http://localhost:3000/");
        assert_eq!(normalize_root("  "), "/");
    }

    #[test]
    fn test_split_list_skips_blanks() {
        let origins = split_list("http://a.test, ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_login_error_url_uses_fragment() {
        let config = AppConfig::default();
        assert_eq!(
            config.login_error_url("invalid_state"),
            "/#/login?error=invalid_state"
        );
    }

    #[test]
    fn test_google_disabled_without_secret() {
        let google = GoogleConfig {
            client_id: Some("id".to_string()),
            ..GoogleConfig::default()
        };
        assert!(!google.is_configured());
    }
}
