//! Student project endpoints.
//!
//! These routes exist to exercise the full auth path end to end: rate
//! limit, guard, authoritative identity resolution, then the store. The
//! project store itself is a thin collaborator; anything richer than
//! create/list is out of scope for this service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{Instrument, error};
use ulid::Ulid;
use utoipa::ToSchema;

use super::auth::identity::Role;
use super::auth::rate_limit::{CREATE_PROJECT_POLICY, LIST_PROJECTS_POLICY, RateLimitDecision};
use super::auth::state::AuthState;
use super::auth::{AuthError, AuthenticatedUser, authenticate, resolve_identity};
use std::sync::Arc;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "githubUrl", default)]
    pub github_url: Option<String>,
    pub skills: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "githubUrl")]
    pub github_url: Option<String>,
    pub skills: Vec<String>,
    #[serde(rename = "addedById")]
    pub added_by_id: String,
    #[serde(rename = "createdAt")]
    pub created_at_unix: i64,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub github_url: Option<String>,
    pub skills: Vec<String>,
    pub added_by_id: String,
}

#[derive(Debug)]
pub enum CreateProjectOutcome {
    Created(ProjectRecord),
    DuplicateTitle,
}

/// Storage collaborator for student projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, project: NewProject) -> Result<CreateProjectOutcome>;

    /// Projects created by the given student, newest first.
    async fn list_for(&self, student_id: &str) -> Result<Vec<ProjectRecord>>;
}

#[utoipa::path(
    post,
    path = "/api/student/project",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectRecord),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Only students can create projects"),
        (status = 409, description = "Duplicate project title"),
        (status = 429, description = "Too many attempts")
    ),
    tag = "projects"
)]
pub async fn create_project(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    projects: Extension<Arc<dyn ProjectStore>>,
    payload: Option<Json<CreateProjectRequest>>,
) -> Response {
    let identifier = format!("create-project:{}", super::auth::client_ip(&headers));
    if let RateLimitDecision::Limited {
        lockout_minutes_remaining,
    } = state
        .rate_limiter()
        .check(&identifier, CREATE_PROJECT_POLICY)
    {
        return AuthError::RateLimitExceeded {
            lockout_minutes_remaining,
        }
        .into_response();
    }

    let student = match require_student(&headers, &state).await {
        Ok(student) => student,
        Err(err) => return err.into_response(),
    };

    let Some(Json(request)) = payload else {
        return AuthError::Validation("Missing payload".to_string()).into_response();
    };

    let project = match validate(request, &student.user_id) {
        Ok(project) => project,
        Err(err) => return err.into_response(),
    };

    match projects.create(project).await {
        Ok(CreateProjectOutcome::Created(record)) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Project created successfully",
                "project": record,
            })),
        )
            .into_response(),
        Ok(CreateProjectOutcome::DuplicateTitle) => {
            AuthError::DuplicateProjectTitle.into_response()
        }
        Err(err) => {
            error!("Project creation failed: {err}");
            AuthError::Internal.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/student/project",
    responses(
        (status = 200, description = "Projects created by the caller"),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Only students can list their projects"),
        (status = 429, description = "Too many requests")
    ),
    tag = "projects"
)]
pub async fn list_projects(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    projects: Extension<Arc<dyn ProjectStore>>,
) -> Response {
    let identifier = format!("get-projects:{}", super::auth::client_ip(&headers));
    if let RateLimitDecision::Limited {
        lockout_minutes_remaining,
    } = state.rate_limiter().check(&identifier, LIST_PROJECTS_POLICY)
    {
        return AuthError::RateLimitExceeded {
            lockout_minutes_remaining,
        }
        .into_response();
    }

    let student = match require_student(&headers, &state).await {
        Ok(student) => student,
        Err(err) => return err.into_response(),
    };

    match projects.list_for(&student.user_id).await {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "projects": records },
            })),
        )
            .into_response(),
        Err(err) => {
            error!("Project listing failed: {err}");
            AuthError::Internal.into_response()
        }
    }
}

/// Guard + authoritative role resolution: the claim must say student AND
/// the id must resolve to the student collection.
async fn require_student(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<AuthenticatedUser, AuthError> {
    let user = authenticate(headers, state, Some(Role::Student))?;
    let identity = resolve_identity(&user, state.identities()).await?;
    if identity.kind != Role::Student {
        return Err(AuthError::UserNotFound);
    }
    Ok(user)
}

fn validate(request: CreateProjectRequest, student_id: &str) -> Result<NewProject, AuthError> {
    let title = request.title.trim().to_string();
    if title.chars().count() < 3 || title.chars().count() > 100 {
        return Err(AuthError::Validation(
            "Project title must be between 3 and 100 characters".to_string(),
        ));
    }

    let description = request.description.trim().to_string();
    if description.chars().count() < 10 || description.chars().count() > 2000 {
        return Err(AuthError::Validation(
            "Project description must be between 10 and 2000 characters".to_string(),
        ));
    }

    let github_url = match request.github_url.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(candidate) => {
            if url::Url::parse(candidate).is_err()
                || !candidate.starts_with("https://github.com/")
            {
                return Err(AuthError::Validation(
                    "Must be a valid GitHub repository URL".to_string(),
                ));
            }
            Some(candidate.to_string())
        }
    };

    let skills: Vec<String> = request
        .skills
        .iter()
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty())
        .collect();
    if skills.is_empty() || skills.len() > 20 {
        return Err(AuthError::Validation(
            "Between 1 and 20 skills are required".to_string(),
        ));
    }
    if skills.iter().any(|skill| skill.chars().count() > 50) {
        return Err(AuthError::Validation(
            "Each skill must be 50 characters or less".to_string(),
        ));
    }

    Ok(NewProject {
        title,
        description,
        github_url,
        skills,
        added_by_id: student_id.to_string(),
    })
}

/// In-memory project store for single-instance and test deployments.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: Mutex<HashMap<String, ProjectRecord>>,
}

impl MemoryProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects; lets tests assert the store was never hit.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.lock().map(|map| map.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create(&self, project: NewProject) -> Result<CreateProjectOutcome> {
        let mut projects = self
            .projects
            .lock()
            .map_err(|_| anyhow::anyhow!("project store lock poisoned"))?;
        let duplicate = projects.values().any(|existing| {
            existing.added_by_id == project.added_by_id
                && existing.title.to_lowercase() == project.title.to_lowercase()
        });
        if duplicate {
            return Ok(CreateProjectOutcome::DuplicateTitle);
        }
        let record = ProjectRecord {
            id: format!("project_{}", Ulid::new()),
            title: project.title,
            description: project.description,
            github_url: project.github_url,
            skills: project.skills,
            added_by_id: project.added_by_id,
            created_at_unix: now_unix_seconds(),
        };
        projects.insert(record.id.clone(), record.clone());
        Ok(CreateProjectOutcome::Created(record))
    }

    async fn list_for(&self, student_id: &str) -> Result<Vec<ProjectRecord>> {
        let projects = self
            .projects
            .lock()
            .map_err(|_| anyhow::anyhow!("project store lock poisoned"))?;
        let mut records: Vec<ProjectRecord> = projects
            .values()
            .filter(|record| record.added_by_id == student_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| std::cmp::Reverse(record.created_at_unix));
        Ok(records)
    }
}

/// Postgres-backed project store.
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create(&self, project: NewProject) -> Result<CreateProjectOutcome> {
        let duplicate_query = r"
            SELECT 1 FROM projects
            WHERE added_by_id = $1 AND LOWER(title) = LOWER($2)
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let duplicate = sqlx::query(duplicate_query)
            .bind(&project.added_by_id)
            .bind(&project.title)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to check for duplicate project title")?;
        if duplicate.is_some() {
            return Ok(CreateProjectOutcome::DuplicateTitle);
        }

        let record = ProjectRecord {
            id: format!("project_{}", Ulid::new()),
            title: project.title,
            description: project.description,
            github_url: project.github_url,
            skills: project.skills,
            added_by_id: project.added_by_id,
            created_at_unix: now_unix_seconds(),
        };

        let insert_query = r"
            INSERT INTO projects (id, title, description, github_url, skills, added_by_id, created_at_unix)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT"
        );
        sqlx::query(insert_query)
            .bind(&record.id)
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.github_url)
            .bind(&record.skills)
            .bind(&record.added_by_id)
            .bind(record.created_at_unix)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert project")?;

        Ok(CreateProjectOutcome::Created(record))
    }

    async fn list_for(&self, student_id: &str) -> Result<Vec<ProjectRecord>> {
        let query = r"
            SELECT id, title, description, github_url, skills, added_by_id, created_at_unix
            FROM projects
            WHERE added_by_id = $1
            ORDER BY created_at_unix DESC
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let rows = sqlx::query(query)
            .bind(student_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list projects")?;

        Ok(rows
            .into_iter()
            .map(|row| ProjectRecord {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                github_url: row.get("github_url"),
                skills: row.get("skills"),
                added_by_id: row.get("added_by_id"),
                created_at_unix: row.get("created_at_unix"),
            })
            .collect())
    }
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateProjectRequest {
        CreateProjectRequest {
            title: "Campus Notes".to_string(),
            description: "Shared lecture notes for first-year courses".to_string(),
            github_url: Some("https://github.com/alice/campus-notes".to_string()),
            skills: vec!["rust".to_string(), "postgres".to_string()],
        }
    }

    #[test]
    fn validate_accepts_well_formed_projects() {
        let project = validate(request(), "student_1").expect("valid project");
        assert_eq!(project.added_by_id, "student_1");
        assert_eq!(project.skills, vec!["rust", "postgres"]);
    }

    #[test]
    fn validate_rejects_short_titles_and_descriptions() {
        let mut bad = request();
        bad.title = "ab".to_string();
        assert!(validate(bad, "student_1").is_err());

        let mut bad = request();
        bad.description = "too short".to_string();
        assert!(validate(bad, "student_1").is_err());
    }

    #[test]
    fn validate_rejects_non_github_urls() {
        let mut bad = request();
        bad.github_url = Some("https://gitlab.com/alice/project".to_string());
        assert!(validate(bad, "student_1").is_err());
    }

    #[test]
    fn validate_treats_empty_url_as_absent() {
        let mut ok = request();
        ok.github_url = Some(String::new());
        let project = validate(ok, "student_1").expect("valid project");
        assert_eq!(project.github_url, None);
    }

    #[test]
    fn validate_requires_at_least_one_skill() {
        let mut bad = request();
        bad.skills = vec!["   ".to_string()];
        assert!(validate(bad, "student_1").is_err());
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_titles_per_student() -> Result<()> {
        let store = MemoryProjectStore::new();
        let project = validate(request(), "student_1").map_err(|err| anyhow::anyhow!("{err}"))?;

        let first = store.create(project.clone()).await?;
        assert!(matches!(first, CreateProjectOutcome::Created(_)));

        let second = store.create(project.clone()).await?;
        assert!(matches!(second, CreateProjectOutcome::DuplicateTitle));

        // Same title from a different student is fine.
        let mut other = project;
        other.added_by_id = "student_2".to_string();
        let third = store.create(other).await?;
        assert!(matches!(third, CreateProjectOutcome::Created(_)));
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_lists_only_the_callers_projects() -> Result<()> {
        let store = MemoryProjectStore::new();
        let mine = validate(request(), "student_1").map_err(|err| anyhow::anyhow!("{err}"))?;
        store.create(mine).await?;

        let mut theirs = validate(request(), "student_2").map_err(|err| anyhow::anyhow!("{err}"))?;
        theirs.title = "Another Project".to_string();
        store.create(theirs).await?;

        let records = store.list_for("student_1").await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].added_by_id, "student_1");
        Ok(())
    }
}
