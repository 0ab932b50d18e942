//! # Campusphere Auth Service
//!
//! `campusphere` is the authentication and authorization layer for the
//! Campusphere network, which connects students, teachers, colleges, and
//! recruiters.
//!
//! ## Credentials
//!
//! A session credential is a compact HS256-signed token carrying the user id,
//! email, and account role. It is transported exclusively as the `auth-token`
//! `HttpOnly` cookie and is valid for seven days. The raw credential is never
//! echoed in response bodies.
//!
//! ## Request Gating
//!
//! Every request passes through two independent layers:
//!
//! - The **edge gatekeeper** intercepts all requests before routing and
//!   decides, from cookie presence and the target path alone, whether to pass
//!   the request through, redirect the browser, or answer `401` outright.
//! - The **route guard** re-verifies the credential per protected endpoint
//!   and enforces the required role, so no handler ever trusts upstream
//!   layers blindly.
//!
//! ## Roles
//!
//! Roles are `student`, `teacher`, `college`, and `recruiter`. For
//! role-gated API routes, the role claimed inside the credential is not
//! trusted alone: the authoritative role is re-resolved against the identity
//! store, checking collections in a fixed precedence order
//! (student, teacher, college admin, recruiter).
//!
//! ## Rate Limiting
//!
//! Sign-in, sign-up, and project routes are rate limited per client IP using
//! a fixed attempt window with lockouts. The limiter store is process-local
//! and injectable behind a trait so multi-instance deployments can swap in a
//! shared atomic store. Limiter failures fail open: the limiter must never
//! become its own denial of service.

pub mod api;
pub mod cli;
pub mod client;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
