//! Student sign-in endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use super::cookie::auth_cookie;
use super::error::AuthError;
use super::identity::{Role, StudentAccount};
use super::rate_limit::{RateLimitDecision, SIGNIN_POLICY};
use super::state::AuthState;
use super::types::{AuthResponse, SigninRequest, StudentProfile};
use super::utils::{client_ip, normalize_email, valid_email};

#[utoipa::path(
    post,
    path = "/api/auth/student/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many attempts")
    ),
    tag = "auth"
)]
pub async fn signin(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<SigninRequest>>,
) -> Response {
    // Rate-limit before any validation so abuse stays cheap to reject.
    let identifier = format!("student-signin:{}", client_ip(&headers));
    if let RateLimitDecision::Limited {
        lockout_minutes_remaining,
    } = state.rate_limiter().check(&identifier, SIGNIN_POLICY)
    {
        return AuthError::RateLimitExceeded {
            lockout_minutes_remaining,
        }
        .into_response();
    }

    let Some(Json(request)) = payload else {
        return AuthError::Validation("Missing payload".to_string()).into_response();
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return AuthError::Validation("Invalid email address".to_string()).into_response();
    }
    if request.password.is_empty() {
        return AuthError::Validation("Password is required".to_string()).into_response();
    }

    let student = match state.identities().find_student_by_email(&email).await {
        Ok(Some(student)) => student,
        // Unknown account and wrong password are indistinguishable on purpose.
        Ok(None) => return AuthError::InvalidCredentials.into_response(),
        Err(err) => {
            error!("Student lookup failed: {err}");
            return AuthError::Internal.into_response();
        }
    };

    match bcrypt::verify(&request.password, &student.password_hash) {
        Ok(true) => {}
        Ok(false) => return AuthError::InvalidCredentials.into_response(),
        Err(err) => {
            error!("Password verification failed: {err}");
            return AuthError::Internal.into_response();
        }
    }

    // Successful sign-in undoes earlier failed attempts from this client.
    state.rate_limiter().reset(&identifier);

    issue_session(&state, student, "Login successful", StatusCode::OK)
}

/// Build the success response with the session cookie attached.
pub(super) fn issue_session(
    state: &AuthState,
    student: StudentAccount,
    message: &str,
    status: StatusCode,
) -> Response {
    let token = match state.issue_token(&student.id, &student.email, Role::Student) {
        Ok(token) => token,
        Err(err) => {
            error!("Token issuance failed: {err}");
            return AuthError::Internal.into_response();
        }
    };

    let cookie = match auth_cookie(
        &token,
        state.config().token_ttl_seconds(),
        state.config().cookie_secure(),
    ) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Session cookie could not be built: {err}");
            return AuthError::Internal.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);

    let body = AuthResponse {
        success: true,
        message: message.to_string(),
        student: StudentProfile {
            id: student.id,
            email: student.email,
            name: student.name,
            college: student.college,
        },
    };

    (status, response_headers, Json(body)).into_response()
}
