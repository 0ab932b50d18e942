//! Edge gatekeeper: the first-line interceptor applied before any handler.
//!
//! Decides allow/redirect/401 purely from cookie presence, credential
//! validity, and the target path. Every request maps to exactly one
//! terminal action: pass through, redirect, answer 401, or forward with
//! identity headers attached. Route handlers still run their own guard;
//! this layer exists for defense in depth and for browser redirects.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::cookie::{clear_auth_cookie, extract_cookie_token};
use super::error::AuthError;
use super::paths::{self, RouteClass, SIGN_IN_PATH};
use super::state::AuthState;
use super::token::TokenClaims;

pub async fn gatekeeper(
    State(state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if paths::is_static_asset(&path) {
        return next.run(request).await;
    }

    let class = paths::classify(&path);
    let Some(credential) = extract_cookie_token(request.headers()) else {
        return handle_anonymous(class, request, next).await;
    };

    match state.verify_token(&credential) {
        Ok(claims) => handle_authenticated(class, &path, claims, request, next).await,
        Err(err) => {
            debug!("Gatekeeper rejected credential on {path}: {err}");
            let response = match class {
                RouteClass::Api | RouteClass::AuthApi => AuthError::InvalidToken.into_response(),
                RouteClass::AuthPage | RouteClass::Page => {
                    Redirect::temporary(SIGN_IN_PATH).into_response()
                }
            };
            with_cleared_cookie(response, &state)
        }
    }
}

async fn handle_anonymous(class: RouteClass, request: Request, next: Next) -> Response {
    match class {
        // Auth pages and public auth APIs stay reachable.
        RouteClass::AuthPage | RouteClass::AuthApi => next.run(request).await,
        // Protected APIs are cut off before any handler runs.
        RouteClass::Api => AuthError::Unauthorized.into_response(),
        // Protected pages bounce the browser to sign-in.
        RouteClass::Page => Redirect::temporary(SIGN_IN_PATH).into_response(),
    }
}

async fn handle_authenticated(
    class: RouteClass,
    path: &str,
    claims: TokenClaims,
    mut request: Request,
    next: Next,
) -> Response {
    match class {
        // Signed-in users have no business on auth pages.
        RouteClass::AuthPage => {
            Redirect::temporary(paths::auth_page_redirect(claims.role)).into_response()
        }
        RouteClass::Api | RouteClass::AuthApi => {
            attach_identity_headers(&mut request, &claims);
            next.run(request).await
        }
        RouteClass::Page => {
            if let Some(allowed) = paths::allowed_roles(path) {
                if !allowed.contains(&claims.role) {
                    return Redirect::temporary(claims.role.home_route()).into_response();
                }
            }
            next.run(request).await
        }
    }
}

/// Propagate the verified identity to downstream handlers so they can skip
/// a second verification when they only need the claims.
fn attach_identity_headers(request: &mut Request, claims: &TokenClaims) {
    let headers = request.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&claims.user_id) {
        headers.insert(HeaderName::from_static("x-user-id"), value);
    }
    if let Ok(value) = HeaderValue::from_str(&claims.email) {
        headers.insert(HeaderName::from_static("x-user-email"), value);
    }
    headers.insert(
        HeaderName::from_static("x-user-type"),
        HeaderValue::from_static(claims.role.as_str()),
    );
}

/// The credential itself was the problem; make the client drop it.
fn with_cleared_cookie(mut response: Response, state: &AuthState) -> Response {
    if let Ok(cookie) = clear_auth_cookie(state.config().cookie_secure()) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}
