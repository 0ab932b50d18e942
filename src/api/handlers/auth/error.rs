//! Error taxonomy for the auth surface.
//!
//! Every client-visible failure is converted at the boundary into the
//! `{error, code}` JSON envelope with a matching HTTP status. Nothing in
//! this module is ever allowed to escape as a raw panic or an unstructured
//! string.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::token;

/// Machine-readable error codes, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    MissingToken,
    InvalidToken,
    InsufficientPermissions,
    RateLimitExceeded,
    UserNotFound,
    MethodNotAllowed,
    InternalError,
    InvalidCredentials,
    ValidationError,
    UserExists,
    CollegeNotFound,
    DuplicateProjectTitle,
}

/// Wire shape of every auth failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
}

/// Auth failures surfaced to clients.
#[derive(Debug)]
pub enum AuthError {
    /// No credential on a protected API path (edge gatekeeper).
    Unauthorized,
    /// Route-level guard found no credential.
    MissingToken,
    /// Signature, issuer, or expiry check failed.
    InvalidToken,
    /// Credential role does not match the route requirement.
    InsufficientPermissions,
    /// Limiter is in its locked state.
    RateLimitExceeded { lockout_minutes_remaining: u64 },
    /// Credential valid but the id resolves to no role collection.
    UserNotFound,
    MethodNotAllowed,
    InvalidCredentials,
    Validation(String),
    UserExists,
    CollegeNotFound,
    DuplicateProjectTitle,
    Internal,
}

impl AuthError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::MissingToken => ErrorCode::MissingToken,
            Self::InvalidToken => ErrorCode::InvalidToken,
            Self::InsufficientPermissions => ErrorCode::InsufficientPermissions,
            Self::RateLimitExceeded { .. } => ErrorCode::RateLimitExceeded,
            Self::UserNotFound => ErrorCode::UserNotFound,
            Self::MethodNotAllowed => ErrorCode::MethodNotAllowed,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::UserExists => ErrorCode::UserExists,
            Self::CollegeNotFound => ErrorCode::CollegeNotFound,
            Self::DuplicateProjectTitle => ErrorCode::DuplicateProjectTitle,
            Self::Internal => ErrorCode::InternalError,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized
            | Self::MissingToken
            | Self::InvalidToken
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation(_) | Self::CollegeNotFound => StatusCode::BAD_REQUEST,
            Self::UserExists | Self::DuplicateProjectTitle => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Authentication required"),
            Self::MissingToken => write!(f, "Authentication token is required"),
            Self::InvalidToken => write!(f, "Invalid or expired token"),
            Self::InsufficientPermissions => {
                write!(f, "Access denied for this account type")
            }
            Self::RateLimitExceeded {
                lockout_minutes_remaining,
            } => write!(
                f,
                "Too many attempts. Please try again in {lockout_minutes_remaining} minutes."
            ),
            Self::UserNotFound => write!(f, "User not found or invalid account type"),
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::Validation(message) => write!(f, "{message}"),
            Self::UserExists => write!(f, "A user with this email already exists"),
            Self::CollegeNotFound => write!(f, "Selected college not found"),
            Self::DuplicateProjectTitle => {
                write!(f, "You already have a project with this title")
            }
            Self::Internal => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<token::Error> for AuthError {
    fn from(_: token::Error) -> Self {
        Self::InvalidToken
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
            code: self.code(),
        });
        (self.status(), body).into_response()
    }
}
