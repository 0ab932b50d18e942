//! Role-gated view guard driven by the server-verified account type.
//!
//! This is a UX convenience layer for frontends: it decides whether a view
//! may render or where the browser should go instead. It is never the sole
//! gate; the edge gatekeeper and the route guard stay authoritative on the
//! server.

use crate::api::handlers::auth::Role;

use super::{AccountType, ApiClient, ClientError};

/// What a guarded view should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The caller's role is allowed; render the view.
    Render,
    /// Navigate away, replacing the current history entry.
    Redirect(String),
}

/// Guard for a view restricted to a set of roles.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Vec<Role>,
    fallback_route: Option<String>,
}

impl RoleGuard {
    #[must_use]
    pub fn new(allowed: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed: allowed.into(),
            fallback_route: None,
        }
    }

    /// Where disallowed roles go instead of their per-role default.
    #[must_use]
    pub fn with_fallback_route(mut self, route: impl Into<String>) -> Self {
        self.fallback_route = Some(route.into());
        self
    }

    /// Views for students only.
    #[must_use]
    pub fn student_only() -> Self {
        Self::new([Role::Student])
    }

    /// Views for teaching staff: teachers and college admins.
    #[must_use]
    pub fn staff_only() -> Self {
        Self::new([Role::Teacher, Role::College])
    }

    /// Views for recruiters only.
    #[must_use]
    pub fn recruiter_only() -> Self {
        Self::new([Role::Recruiter])
    }

    /// Decide from a completed account-type fetch.
    ///
    /// Fetch errors and unrecognized roles redirect to sign-in; a
    /// disallowed role goes to the explicit fallback route or its own home.
    #[must_use]
    pub fn decide(&self, outcome: &Result<AccountType, ClientError>) -> GuardDecision {
        let Ok(account) = outcome else {
            return GuardDecision::Redirect("/sign-in".to_string());
        };
        let Some(role) = account.role() else {
            return GuardDecision::Redirect("/sign-in".to_string());
        };

        if self.allowed.contains(&role) {
            return GuardDecision::Render;
        }

        match &self.fallback_route {
            Some(route) => GuardDecision::Redirect(route.clone()),
            None => GuardDecision::Redirect(role.home_route().to_string()),
        }
    }

    /// Fetch the account type and decide. The caller renders its loading
    /// affordance while this is in flight.
    pub async fn resolve(&self, client: &ApiClient, token: &str) -> GuardDecision {
        let outcome = client.account_type(token).await;
        self.decide(&outcome)
    }
}
