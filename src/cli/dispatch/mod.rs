//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action to run, currently only the
//! API server with its full auth configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: auth_opts.token_secret,
        token_issuer: auth_opts.token_issuer,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        frontend_base_url: auth_opts.frontend_base_url,
    }))
}
