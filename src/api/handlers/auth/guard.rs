//! The per-route authenticator.
//!
//! One guard, invoked uniformly by every protected endpoint: extract the
//! credential, verify it, check the required role. Handlers that gate on
//! role additionally re-resolve the authoritative role through the identity
//! store instead of trusting the claim alone.

use axum::http::HeaderMap;
use tracing::error;

use super::cookie::extract_token;
use super::error::AuthError;
use super::identity::{IdentityStore, ResolvedIdentity, Role};
use super::state::AuthState;

/// Identity attached to a request after the guard admits it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// Authenticate a request from its headers.
///
/// Pure classification: no I/O, no side effects. The credential is taken
/// from the `auth-token` cookie, falling back to an `Authorization: Bearer`
/// header.
///
/// # Errors
///
/// - [`AuthError::MissingToken`] when no credential is present,
/// - [`AuthError::InvalidToken`] when verification fails,
/// - [`AuthError::InsufficientPermissions`] when `required_role` does not
///   match the credential's role.
pub fn authenticate(
    headers: &HeaderMap,
    state: &AuthState,
    required_role: Option<Role>,
) -> Result<AuthenticatedUser, AuthError> {
    let credential = extract_token(headers).ok_or(AuthError::MissingToken)?;

    let claims = state.verify_token(&credential)?;

    if let Some(required) = required_role {
        if claims.role != required {
            return Err(AuthError::InsufficientPermissions);
        }
    }

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Resolve the authoritative identity for an authenticated user.
///
/// The credential's role claim is not trusted alone for sensitive routes;
/// this checks the identity collections in their fixed precedence order.
///
/// # Errors
///
/// - [`AuthError::UserNotFound`] when the id is in no role collection,
/// - [`AuthError::Internal`] when the store itself fails.
pub async fn resolve_identity(
    user: &AuthenticatedUser,
    identities: &dyn IdentityStore,
) -> Result<ResolvedIdentity, AuthError> {
    match identities.resolve(&user.user_id).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(AuthError::UserNotFound),
        Err(err) => {
            error!("Identity resolution failed: {err}");
            Err(AuthError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::error::ErrorCode;
    use crate::api::handlers::auth::identity::MemoryIdentityStore;
    use crate::api::handlers::auth::rate_limit::NoopRateLimiter;
    use crate::api::handlers::auth::state::AuthConfig;
    use axum::http::{HeaderValue, header::COOKIE};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn test_state() -> AuthState {
        AuthState::new(
            AuthConfig::new(
                SecretString::from("guard-test-secret".to_string()),
                "http://localhost:3000".to_string(),
            ),
            Arc::new(NoopRateLimiter),
            Arc::new(MemoryIdentityStore::new()),
        )
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("auth-token={token}");
        headers.insert(COOKIE, HeaderValue::from_str(&value).expect("cookie"));
        headers
    }

    #[test]
    fn missing_credential_is_rejected() {
        let state = test_state();
        let result = authenticate(&HeaderMap::new(), &state, None);
        assert_eq!(
            result.map_err(|err| err.code()),
            Err(ErrorCode::MissingToken)
        );
    }

    #[test]
    fn garbage_credential_is_rejected() {
        let state = test_state();
        let headers = cookie_headers("not-a-token");
        let result = authenticate(&headers, &state, None);
        assert_eq!(
            result.map_err(|err| err.code()),
            Err(ErrorCode::InvalidToken)
        );
    }

    #[test]
    fn valid_credential_is_admitted() {
        let state = test_state();
        let token = state
            .issue_token("student_1", "alice@example.com", Role::Student)
            .expect("issue token");
        let headers = cookie_headers(&token);

        let user = authenticate(&headers, &state, None).expect("authenticated");
        assert_eq!(user.user_id, "student_1");
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn bearer_header_is_accepted_as_fallback() {
        let state = test_state();
        let token = state
            .issue_token("student_1", "alice@example.com", Role::Student)
            .expect("issue token");
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );

        assert!(authenticate(&headers, &state, Some(Role::Student)).is_ok());
    }

    #[test]
    fn role_mismatch_is_forbidden() {
        let state = test_state();
        let token = state
            .issue_token("teacher_1", "bob@example.com", Role::Teacher)
            .expect("issue token");
        let headers = cookie_headers(&token);

        let result = authenticate(&headers, &state, Some(Role::Student));
        assert_eq!(
            result.map_err(|err| err.code()),
            Err(ErrorCode::InsufficientPermissions)
        );
    }

    #[tokio::test]
    async fn resolve_identity_maps_missing_users() {
        let identities = MemoryIdentityStore::new();
        let user = AuthenticatedUser {
            user_id: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
            role: Role::Student,
        };
        let result = resolve_identity(&user, &identities).await;
        assert_eq!(
            result.map_err(|err| err.code()),
            Err(ErrorCode::UserNotFound)
        );
    }
}
