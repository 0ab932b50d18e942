//! Auth-related CLI arguments: token secret, issuer, TTL, and frontend origin.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_ISSUER: &str = "token-issuer";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

const DEFAULT_TOKEN_ISSUER: &str = "campusphere";
const DEFAULT_TOKEN_TTL_SECONDS: &str = "604800";
const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign and verify session tokens")
                .env("CAMPUSPHERE_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_ISSUER)
                .long(ARG_TOKEN_ISSUER)
                .help("Issuer tag embedded in session tokens")
                .env("CAMPUSPHERE_TOKEN_ISSUER")
                .default_value(DEFAULT_TOKEN_ISSUER),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("CAMPUSPHERE_TOKEN_TTL_SECONDS")
                .default_value(DEFAULT_TOKEN_TTL_SECONDS)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend origin allowed by CORS; cookies are marked Secure when it is https")
                .env("CAMPUSPHERE_FRONTEND_BASE_URL")
                .default_value(DEFAULT_FRONTEND_BASE_URL),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_issuer: String,
    pub token_ttl_seconds: i64,
    pub frontend_base_url: String,
}

impl Options {
    /// Extract auth options from parsed CLI matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --token-secret")?;

        let token_issuer = matches
            .get_one::<String>(ARG_TOKEN_ISSUER)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOKEN_ISSUER.to_string());

        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(7 * 24 * 60 * 60);

        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_FRONTEND_BASE_URL.to_string());

        Ok(Self {
            token_secret: SecretString::from(token_secret),
            token_issuer,
            token_ttl_seconds,
            frontend_base_url,
        })
    }
}
