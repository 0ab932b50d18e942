use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

use handlers::auth::gatekeeper::gatekeeper;
use handlers::auth::state::AuthState;
use handlers::projects::ProjectStore;
use handlers::{auth, health, method_not_allowed, projects, root};

/// How often the background task reclaims expired rate-limit records.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Build the application router: routes, gatekeeper, and state layers.
///
/// Everything except the listener lives here so tests can drive the full
/// stack in memory.
#[must_use]
pub fn app(auth_state: Arc<AuthState>, projects: Arc<dyn ProjectStore>) -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health).fallback(method_not_allowed))
        .route(
            "/api/auth/student/signin",
            post(auth::signin::signin).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/student/signup",
            post(auth::signup::signup).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/signout",
            post(auth::signout::signout).fallback(method_not_allowed),
        )
        .route(
            "/api/account-type",
            get(auth::account_type::account_type).fallback(method_not_allowed),
        )
        .route(
            "/api/student/project",
            post(projects::create_project)
                .get(projects::list_projects)
                .fallback(method_not_allowed),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            gatekeeper,
        ))
        .layer(Extension(auth_state))
        .layer(Extension(projects))
}

/// Start the server.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(
    port: u16,
    auth_state: Arc<AuthState>,
    projects: Arc<dyn ProjectStore>,
) -> Result<()> {
    spawn_rate_limit_sweeper(auth_state.clone());

    let frontend_origin = frontend_origin(auth_state.config().frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let app = app(auth_state, projects).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Sweeping is pure memory reclamation; any schedule is safe.
fn spawn_rate_limit_sweeper(auth_state: Arc<AuthState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            auth_state.rate_limiter().sweep();
        }
    });
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}
