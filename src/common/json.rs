//! Body and path extractors with structured rejections

use axum::extract::{FromRequest, FromRequestParts};

use super::ApiError;

/// `axum::Json` whose rejection is an [`ApiError::InvalidInput`], so malformed
/// or mistyped bodies get the same `{error, code}` shape as other failures.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);

/// `axum::extract::Path` with the same rejection mapping, e.g. for a task id
/// that is not a number.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ValidPath<T>(pub T);
