// src/services/mod.rs
//
// Credential services shared by the auth handlers: password hashing and the
// delegated identity provider

pub mod google;
pub mod password;

// Re-export commonly used types for convenience
pub use google::{ExternalProfile, GoogleService, IdentityProvider};
