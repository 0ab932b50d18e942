//! Route classification shared by the edge gatekeeper and route guards.
//!
//! Classification is a pure function of the request path so both layers
//! agree on what is public and what is protected.

use super::identity::Role;

pub const SIGN_IN_PATH: &str = "/sign-in";

/// Pages that belong to the auth flow; authenticated users are bounced away.
const AUTH_PAGES: [&str; 3] = ["/", "/sign-in", "/sign-up"];

/// API routes that must stay reachable without a credential.
const AUTH_API_PREFIXES: [&str; 5] = [
    "/api/auth/college/signup",
    "/api/auth/college/signin",
    "/api/auth/student/signup",
    "/api/auth/student/signin",
    "/api/colleges",
];

const API_PREFIX: &str = "/api/";

/// Asset suffixes excluded from gatekeeping, mirroring the frontend's
/// static file matcher.
const ASSET_SUFFIXES: [&str; 8] = [
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".css", ".js",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    /// Sign-in/sign-up/landing pages.
    AuthPage,
    /// Public auth API endpoints.
    AuthApi,
    /// Any other API route; protected.
    Api,
    /// Any other page; protected.
    Page,
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if AUTH_PAGES.contains(&path) {
        return RouteClass::AuthPage;
    }
    if AUTH_API_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return RouteClass::AuthApi;
    }
    if path.starts_with(API_PREFIX) {
        return RouteClass::Api;
    }
    RouteClass::Page
}

/// Static assets bypass the gatekeeper entirely.
#[must_use]
pub fn is_static_asset(path: &str) -> bool {
    path.starts_with("/_next/")
        || path == "/favicon.ico"
        || ASSET_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Roles allowed on a role-reserved page prefix, or `None` for pages open
/// to any authenticated user.
#[must_use]
pub fn allowed_roles(path: &str) -> Option<&'static [Role]> {
    if path.starts_with("/home") {
        return Some(&[Role::Student]);
    }
    if path.starts_with("/dashboard") {
        return Some(&[Role::Teacher, Role::College]);
    }
    if path.starts_with("/recruiter") {
        return Some(&[Role::Recruiter]);
    }
    None
}

/// Where an already-authenticated user lands when hitting an auth page.
///
/// College admins take the `/home` fallback and are then bounced to
/// `/dashboard` by the role-reservation rule, matching observed frontend
/// behavior.
#[must_use]
pub const fn auth_page_redirect(role: Role) -> &'static str {
    match role {
        Role::Student => "/home",
        Role::Teacher => "/dashboard",
        Role::Recruiter => "/recruiter",
        Role::College => "/home",
    }
}
