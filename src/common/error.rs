// Error handling types for the API

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::services::google::GoogleError;
use crate::store::StoreError;

/// Message shared by every failed login so callers cannot tell an unknown
/// email from a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// API error types
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    Unauthenticated(String),
    InvalidCredentials,
    Conflict(String),
    NotFound(String),
    /// OAuth state missing or not matching the one issued for this session
    InvalidState,
    StorageUnavailable(String),
    ServiceUnavailable(String),
    UpstreamProvider(String),
    InternalServer(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::InvalidCredentials => write!(f, "{}", INVALID_CREDENTIALS_MESSAGE),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InvalidState => write!(f, "Invalid OAuth state"),
            ApiError::StorageUnavailable(msg) => write!(f, "Storage Unavailable: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::UpstreamProvider(msg) => write!(f, "Upstream Provider Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidState => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageUnavailable(_) | ApiError::ServiceUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::UpstreamProvider(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidState => "INVALID_STATE",
            ApiError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::UpstreamProvider(_) => "UPSTREAM_PROVIDER_ERROR",
            ApiError::InternalServer(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();

        let error_message = match self {
            ApiError::InvalidInput(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            ApiError::InvalidState => "OAuth state validation failed".to_string(),
            ApiError::StorageUnavailable(msg) => {
                error!(error = %msg, "Storage unavailable");
                "Storage is temporarily unavailable".to_string()
            }
            ApiError::UpstreamProvider(msg) => {
                error!(error = %msg, "Identity provider call failed");
                "Identity provider request failed".to_string()
            }
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                "Internal server error".to_string()
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::InvalidInput(error_messages.join(", "))
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Constraint(msg) => ApiError::InvalidInput(msg),
            StoreError::Unavailable(e) => ApiError::StorageUnavailable(e.to_string()),
        }
    }
}

impl From<GoogleError> for ApiError {
    fn from(err: GoogleError) -> Self {
        match err {
            GoogleError::NotConfigured => {
                ApiError::ServiceUnavailable("Google sign-in is not configured".to_string())
            }
            GoogleError::InvalidConfig(msg) => ApiError::InternalServer(msg),
            other => ApiError::UpstreamProvider(other.to_string()),
        }
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::StorageUnavailable(format!("session store: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}
