//! OpenAPI document for the auth surface.
//!
//! Register new endpoints here so the spec served by the `openapi` binary
//! stays in sync with the router in `api::app`.

use utoipa::OpenApi;

use crate::api::handlers::{auth, health, projects};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "campusphere",
        description = "Authentication and authorization service for the Campusphere network",
        license(name = "BSD-3-Clause"),
        contact(name = "Team Campusphere", email = "team@campusphere.dev"),
    ),
    paths(
        health::health,
        auth::signin::signin,
        auth::signup::signup,
        auth::signout::signout,
        auth::account_type::account_type,
        projects::create_project,
        projects::list_projects,
    ),
    components(schemas(
        auth::types::SigninRequest,
        auth::types::SignupRequest,
        auth::types::StudentProfile,
        auth::types::AuthResponse,
        auth::types::MessageResponse,
        auth::types::AccountTypeResponse,
        auth::identity::Role,
        auth::identity::CollegeSummary,
        projects::CreateProjectRequest,
        projects::ProjectRecord,
    )),
    tags(
        (name = "campusphere", description = "Service endpoints"),
        (name = "auth", description = "Sign-in, sign-up, and session management"),
        (name = "projects", description = "Role-gated student project routes"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
