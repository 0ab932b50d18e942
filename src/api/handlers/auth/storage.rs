//! Postgres-backed identity store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::identity::{
    CollegeSummary, CreateStudentOutcome, IdentityStore, NewStudent, ResolvedIdentity, Role,
    StudentAccount,
};

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn resolve(&self, user_id: &str) -> Result<Option<ResolvedIdentity>> {
        // One polymorphic lookup instead of four round-trips. The precedence
        // column makes the student-first tie-break explicit in case an id
        // ever collides across collections.
        let query = r"
            SELECT kind, id FROM (
                SELECT 'student' AS kind, id, 1 AS precedence
                    FROM students WHERE id = $1
                UNION ALL
                SELECT 'teacher', id, 2 FROM teachers WHERE id = $1
                UNION ALL
                SELECT 'college', id, 3 FROM college_admins WHERE id = $1
                UNION ALL
                SELECT 'recruiter', id, 4 FROM recruiters WHERE id = $1
            ) AS identities
            ORDER BY precedence
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to resolve identity")?;

        row.map(|row| {
            let kind: String = row.get("kind");
            let kind = kind
                .parse::<Role>()
                .map_err(|err| anyhow::anyhow!("unexpected identity kind: {err}"))?;
            Ok(ResolvedIdentity {
                kind,
                id: row.get("id"),
            })
        })
        .transpose()
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<StudentAccount>> {
        let query = r"
            SELECT students.id, students.email, students.name, students.password_hash,
                   colleges.id AS college_id, colleges.name AS college_name,
                   colleges.location AS college_location
            FROM students
            LEFT JOIN colleges ON colleges.id = students.college_id
            WHERE students.email = $1
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup student by email")?;

        Ok(row.map(|row| {
            let college_id: Option<String> = row.get("college_id");
            let college = college_id.map(|id| CollegeSummary {
                id,
                name: row.get("college_name"),
                location: row.get("college_location"),
            });
            StudentAccount {
                id: row.get("id"),
                email: row.get("email"),
                name: row.get("name"),
                password_hash: row.get("password_hash"),
                college,
            }
        }))
    }

    async fn find_college(&self, college_id: &str) -> Result<Option<CollegeSummary>> {
        let query = "SELECT id, name, location FROM colleges WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(college_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup college")?;

        Ok(row.map(|row| CollegeSummary {
            id: row.get("id"),
            name: row.get("name"),
            location: row.get("location"),
        }))
    }

    async fn create_student(&self, student: NewStudent) -> Result<CreateStudentOutcome> {
        let query = r"
            INSERT INTO students (id, email, name, password_hash, college_id)
            VALUES ($1, $2, $3, $4, $5)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT"
        );
        let result = sqlx::query(query)
            .bind(&student.id)
            .bind(&student.email)
            .bind(&student.name)
            .bind(&student.password_hash)
            .bind(&student.college_id)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => {
                let college = self.find_college(&student.college_id).await?;
                Ok(CreateStudentOutcome::Created(StudentAccount {
                    id: student.id,
                    email: student.email,
                    name: student.name,
                    password_hash: student.password_hash,
                    college,
                }))
            }
            Err(err) if is_unique_violation(&err) => Ok(CreateStudentOutcome::EmailTaken),
            Err(err) => Err(err).context("failed to insert student"),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
