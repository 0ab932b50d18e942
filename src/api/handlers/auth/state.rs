//! Auth configuration and shared state.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::identity::{IdentityStore, Role};
use super::rate_limit::RateLimiter;
use super::token::{self, TokenClaims};

const DEFAULT_TOKEN_ISSUER: &str = "campusphere";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    token_secret: SecretString,
    token_issuer: String,
    token_ttl_seconds: i64,
    frontend_base_url: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_secret: SecretString, frontend_base_url: String) -> Self {
        Self {
            token_secret,
            token_issuer: DEFAULT_TOKEN_ISSUER.to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            frontend_base_url,
        }
    }

    #[must_use]
    pub fn with_token_issuer(mut self, issuer: String) -> Self {
        self.token_issuer = issuer;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn token_issuer(&self) -> &str {
        &self.token_issuer
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }

    fn token_secret_bytes(&self) -> &[u8] {
        self.token_secret.expose_secret().as_bytes()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"***")
            .field("token_issuer", &self.token_issuer)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("frontend_base_url", &self.frontend_base_url)
            .finish()
    }
}

/// Shared state for the auth layer: configuration plus the injectable
/// limiter and identity-store collaborators.
pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    identities: Arc<dyn IdentityStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        rate_limiter: Arc<dyn RateLimiter>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            config,
            rate_limiter,
            identities,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(crate) fn identities(&self) -> &dyn IdentityStore {
        self.identities.as_ref()
    }

    /// Issue a session token for a freshly authenticated account.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_token(
        &self,
        user_id: &str,
        email: &str,
        role: Role,
    ) -> Result<String, token::Error> {
        let now = now_unix_seconds();
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role,
            iss: self.config.token_issuer.clone(),
            iat: now,
            exp: now + self.config.token_ttl_seconds,
        };
        token::sign_hs256(self.config.token_secret_bytes(), &claims)
    }

    /// Verify a session token against the configured secret and issuer.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, forged, mis-issued, or
    /// expired.
    pub fn verify_token(&self, credential: &str) -> Result<TokenClaims, token::Error> {
        token::verify_hs256(
            credential,
            self.config.token_secret_bytes(),
            &self.config.token_issuer,
            now_unix_seconds(),
        )
    }
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
