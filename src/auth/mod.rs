//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Local email/password registration and login
//! - Google OAuth sign-in with a session-bound state token
//! - Cookie sessions mapping a browser to a user id
//! - AuthedUser extractor guarding every task and profile route

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod validators;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
pub use session::SessionManager;
