//! Typed client for the Campusphere auth API.
//!
//! Used by frontends and tooling that need the authoritative account type
//! or a server-side sign-out. The client never persists credentials; the
//! caller supplies the session token per request.

pub mod guard;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::api::handlers::auth::{AUTH_COOKIE_NAME, ErrorCode, Role};

/// Successful `GET /api/account-type` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountType {
    #[serde(rename = "accountType")]
    pub account_type: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
}

impl AccountType {
    /// The role, when the server sent a recognized account type.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::from_account_type(&self.account_type)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    code: ErrorCode,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("api error {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<ErrorCode>,
        message: String,
    },
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client for the given server base URL.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch the authoritative account type for a session token.
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] on transport failures and
    /// [`ClientError::Api`] when the server answers with an error envelope.
    pub async fn account_type(&self, token: &str) -> Result<AccountType, ClientError> {
        let url = format!("{}/api/account-type", self.base_url);
        let response = self
            .http
            .get(url)
            .header("Cookie", format!("{AUTH_COOKIE_NAME}={token}"))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<AccountType>().await?);
        }

        Err(api_error(status, response).await)
    }

    /// Clear the session server-side.
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] on transport failures and
    /// [`ClientError::Api`] when the server answers with an error envelope.
    pub async fn sign_out(&self, token: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/auth/signout", self.base_url);
        let response = self
            .http
            .post(url)
            .header("Cookie", format!("{AUTH_COOKIE_NAME}={token}"))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(api_error(status, response).await)
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    match response.json::<ApiErrorBody>().await {
        Ok(body) => ClientError::Api {
            status,
            code: Some(body.code),
            message: body.error,
        },
        Err(_) => ClientError::Api {
            status,
            code: None,
            message: "unreadable error response".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_maps_to_role() {
        let account = AccountType {
            account_type: "TEACHER".to_string(),
            user_id: "teacher_1".to_string(),
            email: "bob@example.com".to_string(),
        };
        assert_eq!(account.role(), Some(Role::Teacher));

        let unknown = AccountType {
            account_type: "ROBOT".to_string(),
            user_id: "x".to_string(),
            email: "x@example.com".to_string(),
        };
        assert_eq!(unknown.role(), None);
    }

    #[test]
    fn client_normalizes_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/").expect("client");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn error_body_parses_envelope() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"Authentication required","code":"UNAUTHORIZED"}"#,
        )
        .expect("parse envelope");
        assert_eq!(body.code, ErrorCode::Unauthorized);
        assert_eq!(body.error, "Authentication required");
    }
}
