//! Enrollment repository for database operations.
//!
//! Implements the domain record store on PostgreSQL. Status changes and the
//! joined timestamp are written with conditional `UPDATE ... WHERE` clauses,
//! so each write either applies atomically or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::errors::StoreError;
use domain::models::{Course, Enrollment, EnrollmentStatus, StatusChange};
use domain::store::EnrollmentStore;
use sqlx::PgPool;

use crate::entities::{CourseEntity, EnrollmentEntity, EnrollmentStatusDb};
use crate::metrics::{record_pool_metrics, QueryTimer};

/// Repository for enrollment and course database operations.
#[derive(Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Creates a new EnrollmentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a sqlx error into the store taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::InvalidRecord(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

#[async_trait]
impl EnrollmentStore for EnrollmentRepository {
    async fn ping(&self) -> Result<(), StoreError> {
        let timer = QueryTimer::new("ping");
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        timer.finish(&result);
        record_pool_metrics(&self.pool);
        result.map(|_| ()).map_err(map_sqlx_error)
    }

    async fn find_enrollment(&self, id: &str) -> Result<Option<Enrollment>, StoreError> {
        let timer = QueryTimer::new("find_enrollment_by_id");
        let result = sqlx::query_as::<_, EnrollmentEntity>(
            r#"
            SELECT id, user_id, course_id, status, rejection_reason, approved_by,
                   telegram_joined_at, created_at, updated_at
            FROM enrollments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
            .map(|row| row.map(Enrollment::from))
            .map_err(map_sqlx_error)
    }

    async fn find_enrollment_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let timer = QueryTimer::new("find_enrollment_for_user_course");
        let result = sqlx::query_as::<_, EnrollmentEntity>(
            r#"
            SELECT id, user_id, course_id, status, rejection_reason, approved_by,
                   telegram_joined_at, created_at, updated_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2
            ORDER BY (status = 'approved') DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
            .map(|row| row.map(Enrollment::from))
            .map_err(map_sqlx_error)
    }

    async fn find_course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        let timer = QueryTimer::new("find_course_by_id");
        let result = sqlx::query_as::<_, CourseEntity>(
            r#"
            SELECT id, title, telegram_group_link
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
            .map(|row| row.map(Course::from))
            .map_err(map_sqlx_error)
    }

    async fn update_status_if(
        &self,
        id: &str,
        expected: EnrollmentStatus,
        change: &StatusChange,
    ) -> Result<Option<Enrollment>, StoreError> {
        let rejection_reason = match change.status {
            EnrollmentStatus::Rejected => change.rejection_reason.as_deref(),
            _ => None,
        };

        let timer = QueryTimer::new("update_enrollment_status_if");
        let result = sqlx::query_as::<_, EnrollmentEntity>(
            r#"
            UPDATE enrollments
            SET status = $3, approved_by = $4, rejection_reason = $5, updated_at = $6
            WHERE id = $1 AND status = $2
            RETURNING id, user_id, course_id, status, rejection_reason, approved_by,
                      telegram_joined_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(EnrollmentStatusDb::from(expected))
        .bind(EnrollmentStatusDb::from(change.status))
        .bind(&change.actor_id)
        .bind(rejection_reason)
        .bind(change.at)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
            .map(|row| row.map(Enrollment::from))
            .map_err(map_sqlx_error)
    }

    async fn set_joined_if_unset(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("set_enrollment_joined_if_unset");
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET telegram_joined_at = $2, updated_at = $2
            WHERE id = $1 AND status = 'approved' AND telegram_joined_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.finish(&result);
        result
            .map(|r| r.rows_affected() > 0)
            .map_err(map_sqlx_error)
    }
}
