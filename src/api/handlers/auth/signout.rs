//! Sign-out endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use super::cookie::clear_auth_cookie;
use super::error::AuthError;
use super::state::AuthState;
use super::types::MessageResponse;

#[utoipa::path(
    post,
    path = "/api/auth/signout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn signout(state: Extension<Arc<AuthState>>) -> Response {
    // Always clear the cookie; signing out without a session is fine.
    let cookie = match clear_auth_cookie(state.config().cookie_secure()) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Clear cookie could not be built: {err}");
            return AuthError::Internal.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    let body = MessageResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    };

    (StatusCode::OK, headers, Json(body)).into_response()
}
