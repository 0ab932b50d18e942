use crate::api;
use crate::api::handlers::auth::{AuthConfig, AuthState, MemoryRateLimiter};
use crate::api::handlers::auth::storage::PgIdentityStore;
use crate::api::handlers::projects::PgProjectStore;
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_issuer: String,
    pub token_ttl_seconds: i64,
    pub frontend_base_url: String,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let auth_config = AuthConfig::new(args.token_secret, args.frontend_base_url)
        .with_token_issuer(args.token_issuer)
        .with_token_ttl_seconds(args.token_ttl_seconds);

    let auth_state = Arc::new(AuthState::new(
        auth_config,
        Arc::new(MemoryRateLimiter::new()),
        Arc::new(PgIdentityStore::new(pool.clone())),
    ));

    let projects = Arc::new(PgProjectStore::new(pool));

    api::new(args.port, auth_state, projects).await
}
