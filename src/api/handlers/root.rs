use axum::response::{IntoResponse, Json};
use serde_json::json;

// Service banner; also the landing path the gatekeeper treats as an auth page.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
