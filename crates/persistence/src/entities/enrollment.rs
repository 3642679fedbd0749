//! Enrollment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Enrollment, EnrollmentStatus};
use sqlx::FromRow;

/// Database enum for enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
pub enum EnrollmentStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<EnrollmentStatusDb> for EnrollmentStatus {
    fn from(status: EnrollmentStatusDb) -> Self {
        match status {
            EnrollmentStatusDb::Pending => EnrollmentStatus::Pending,
            EnrollmentStatusDb::Approved => EnrollmentStatus::Approved,
            EnrollmentStatusDb::Rejected => EnrollmentStatus::Rejected,
        }
    }
}

impl From<EnrollmentStatus> for EnrollmentStatusDb {
    fn from(status: EnrollmentStatus) -> Self {
        match status {
            EnrollmentStatus::Pending => EnrollmentStatusDb::Pending,
            EnrollmentStatus::Approved => EnrollmentStatusDb::Approved,
            EnrollmentStatus::Rejected => EnrollmentStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the enrollments table.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentEntity {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub status: EnrollmentStatusDb,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<String>,
    pub telegram_joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EnrollmentEntity> for Enrollment {
    fn from(entity: EnrollmentEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            course_id: entity.course_id,
            status: entity.status.into(),
            rejection_reason: entity.rejection_reason,
            approved_by: entity.approved_by,
            telegram_joined_at: entity.telegram_joined_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
