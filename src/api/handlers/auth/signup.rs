//! Student sign-up endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;
use ulid::Ulid;

use super::error::AuthError;
use super::identity::{CreateStudentOutcome, NewStudent};
use super::rate_limit::{RateLimitDecision, SIGNUP_POLICY};
use super::signin::issue_session;
use super::state::AuthState;
use super::types::{AuthResponse, SignupRequest};
use super::utils::{client_ip, normalize_email, password_policy_violation, valid_email};

const BCRYPT_COST: u32 = 12;

#[utoipa::path(
    post,
    path = "/api/auth/student/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Too many attempts")
    ),
    tag = "auth"
)]
pub async fn signup(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let identifier = format!("student-signup:{}", client_ip(&headers));
    if let RateLimitDecision::Limited {
        lockout_minutes_remaining,
    } = state.rate_limiter().check(&identifier, SIGNUP_POLICY)
    {
        return AuthError::RateLimitExceeded {
            lockout_minutes_remaining,
        }
        .into_response();
    }

    let Some(Json(request)) = payload else {
        return AuthError::Validation("Missing payload".to_string()).into_response();
    };

    if let Err(err) = validate(&request) {
        return err.into_response();
    }
    let email = normalize_email(&request.email);

    match state.identities().find_college(&request.college_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return AuthError::CollegeNotFound.into_response(),
        Err(err) => {
            error!("College lookup failed: {err}");
            return AuthError::Internal.into_response();
        }
    }

    let password_hash = match bcrypt::hash(&request.password, BCRYPT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Password hashing failed: {err}");
            return AuthError::Internal.into_response();
        }
    };

    let student = NewStudent {
        id: format!("student_{}", Ulid::new()),
        email,
        name: request.name.trim().to_string(),
        password_hash,
        college_id: request.college_id,
    };

    let account = match state.identities().create_student(student).await {
        Ok(CreateStudentOutcome::Created(account)) => account,
        // Creation races resolve at the store; both paths answer 409.
        Ok(CreateStudentOutcome::EmailTaken) => return AuthError::UserExists.into_response(),
        Err(err) => {
            error!("Student creation failed: {err}");
            return AuthError::Internal.into_response();
        }
    };

    issue_session(
        &state,
        account,
        "Account created successfully",
        StatusCode::CREATED,
    )
}

fn validate(request: &SignupRequest) -> Result<(), AuthError> {
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }
    if let Some(violation) = password_policy_violation(&request.password) {
        return Err(AuthError::Validation(violation.to_string()));
    }
    if request.password != request.confirm_password {
        return Err(AuthError::Validation("Passwords don't match".to_string()));
    }
    let name = request.name.trim();
    if name.chars().count() < 2 || name.chars().count() > 100 {
        return Err(AuthError::Validation(
            "Name must be between 2 and 100 characters".to_string(),
        ));
    }
    if request.college_id.trim().is_empty() {
        return Err(AuthError::Validation(
            "College selection is required".to_string(),
        ));
    }
    Ok(())
}
