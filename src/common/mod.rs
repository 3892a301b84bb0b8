// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod json;
pub mod migrations;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{generate_state_token, safe_email_log, safe_token_log};
pub use json::{ValidJson, ValidPath};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
