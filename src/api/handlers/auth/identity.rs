//! Roles and authoritative identity resolution.
//!
//! A credential's role claim is enough to gate pages, but role-gated API
//! routes re-resolve the role against the identity store before trusting it.
//! Resolution checks the role collections in a fixed precedence order
//! (student, teacher, college admin, recruiter) so that an id colliding
//! across collections resolves deterministically.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use utoipa::ToSchema;

/// Account role carried inside session credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    College,
    Recruiter,
}

impl Role {
    /// Lowercase form used in token claims and forwarded request headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::College => "college",
            Self::Recruiter => "recruiter",
        }
    }

    /// Uppercase form used by the account-type API.
    #[must_use]
    pub const fn account_type(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Teacher => "TEACHER",
            Self::College => "COLLEGE",
            Self::Recruiter => "RECRUITER",
        }
    }

    #[must_use]
    pub fn from_account_type(value: &str) -> Option<Self> {
        match value {
            "STUDENT" => Some(Self::Student),
            "TEACHER" => Some(Self::Teacher),
            "COLLEGE" => Some(Self::College),
            "RECRUITER" => Some(Self::Recruiter),
            _ => None,
        }
    }

    /// Home route each role lands on after authentication.
    #[must_use]
    pub const fn home_route(self) -> &'static str {
        match self {
            Self::Student => "/home",
            Self::Teacher | Self::College => "/dashboard",
            Self::Recruiter => "/recruiter",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "college" => Ok(Self::College),
            "recruiter" => Ok(Self::Recruiter),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Outcome of the authoritative identity lookup: which collection the id was
/// found in, under the documented precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub kind: Role,
    pub id: String,
}

/// Minimal college data surfaced on signup and in student profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CollegeSummary {
    pub id: String,
    pub name: String,
    pub location: String,
}

/// Student account data needed by the auth endpoints. The password field
/// holds a bcrypt hash, never a raw password.
#[derive(Debug, Clone)]
pub struct StudentAccount {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub college: Option<CollegeSummary>,
}

/// Fields required to create a student account.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub college_id: String,
}

/// Outcome when attempting to create a student account.
#[derive(Debug)]
pub enum CreateStudentOutcome {
    Created(StudentAccount),
    EmailTaken,
}

/// Read/create access to the identity collections.
///
/// The service treats the identity store as an external collaborator; this
/// trait is the seam between the auth layer and whatever backs it.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Single polymorphic lookup across the role collections.
    ///
    /// Checks student, then teacher, then college admin, then recruiter;
    /// the first hit wins.
    async fn resolve(&self, user_id: &str) -> Result<Option<ResolvedIdentity>>;

    async fn find_student_by_email(&self, email: &str) -> Result<Option<StudentAccount>>;

    async fn find_college(&self, college_id: &str) -> Result<Option<CollegeSummary>>;

    async fn create_student(&self, student: NewStudent) -> Result<CreateStudentOutcome>;
}

/// In-memory identity store for single-instance and test deployments.
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<MemoryIdentityInner>,
}

#[derive(Default)]
struct MemoryIdentityInner {
    students: HashMap<String, StudentAccount>,
    teachers: Vec<String>,
    college_admins: Vec<String>,
    recruiters: Vec<String>,
    colleges: HashMap<String, CollegeSummary>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a student account. Replaces any existing account with the same id.
    pub fn insert_student(&self, student: StudentAccount) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.students.insert(student.id.clone(), student);
        }
    }

    pub fn remove_student(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.students.remove(id);
        }
    }

    pub fn insert_teacher(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.teachers.push(id.to_string());
        }
    }

    pub fn insert_college_admin(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.college_admins.push(id.to_string());
        }
    }

    pub fn insert_recruiter(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.recruiters.push(id.to_string());
        }
    }

    pub fn insert_college(&self, college: CollegeSummary) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.colleges.insert(college.id.clone(), college);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryIdentityInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("identity store lock poisoned"))
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn resolve(&self, user_id: &str) -> Result<Option<ResolvedIdentity>> {
        let inner = self.lock()?;
        // Precedence: student before teacher before college admin before recruiter.
        let kind = if inner.students.contains_key(user_id) {
            Some(Role::Student)
        } else if inner.teachers.iter().any(|id| id == user_id) {
            Some(Role::Teacher)
        } else if inner.college_admins.iter().any(|id| id == user_id) {
            Some(Role::College)
        } else if inner.recruiters.iter().any(|id| id == user_id) {
            Some(Role::Recruiter)
        } else {
            None
        };
        Ok(kind.map(|kind| ResolvedIdentity {
            kind,
            id: user_id.to_string(),
        }))
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<StudentAccount>> {
        let inner = self.lock()?;
        Ok(inner
            .students
            .values()
            .find(|student| student.email == email)
            .cloned())
    }

    async fn find_college(&self, college_id: &str) -> Result<Option<CollegeSummary>> {
        let inner = self.lock()?;
        Ok(inner.colleges.get(college_id).cloned())
    }

    async fn create_student(&self, student: NewStudent) -> Result<CreateStudentOutcome> {
        let mut inner = self.lock()?;
        if inner
            .students
            .values()
            .any(|existing| existing.email == student.email)
        {
            return Ok(CreateStudentOutcome::EmailTaken);
        }
        let college = inner.colleges.get(&student.college_id).cloned();
        let account = StudentAccount {
            id: student.id,
            email: student.email,
            name: student.name,
            password_hash: student.password_hash,
            college,
        };
        inner.students.insert(account.id.clone(), account.clone());
        Ok(CreateStudentOutcome::Created(account))
    }
}
