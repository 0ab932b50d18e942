//! API handlers.

pub mod auth;
pub mod health;
pub mod projects;
pub mod root;

use axum::response::{IntoResponse, Response};

use auth::AuthError;

/// Shared fallback for unsupported verbs on known endpoints.
pub async fn method_not_allowed() -> Response {
    AuthError::MethodNotAllowed.into_response()
}
