//! Account-type endpoint backing the client-side role guard.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::guard::{authenticate, resolve_identity};
use super::state::AuthState;
use super::types::AccountTypeResponse;

#[utoipa::path(
    get,
    path = "/api/account-type",
    responses(
        (status = 200, description = "Authoritative account type", body = AccountTypeResponse),
        (status = 401, description = "Missing or invalid credential"),
        (status = 404, description = "Credential valid but identity unresolvable")
    ),
    tag = "auth"
)]
pub async fn account_type(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> Response {
    let user = match authenticate(&headers, &state, None) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    // The claim's role is not trusted here; re-derive it from the store.
    let identity = match resolve_identity(&user, state.identities()).await {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    let body = AccountTypeResponse {
        success: true,
        account_type: identity.kind.account_type().to_string(),
        user_id: user.user_id,
        email: user.email,
    };

    (StatusCode::OK, Json(body)).into_response()
}
