//! Record store collaborator for enrollments and courses.
//!
//! The store is an external dependency. Implementations must offer
//! read-your-writes consistency on a single record key and must apply the
//! conditional updates below atomically; the services rely on them instead
//! of locking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Course, Enrollment, EnrollmentStatus, StatusChange};

/// Access to persisted enrollments and courses.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Loads an enrollment by id.
    async fn find_enrollment(&self, id: &str) -> Result<Option<Enrollment>, StoreError>;

    /// Loads a user's enrollment for a course, preferring an approved one,
    /// then the most recent.
    async fn find_enrollment_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError>;

    /// Loads a course by id.
    async fn find_course(&self, id: &str) -> Result<Option<Course>, StoreError>;

    /// Applies `change` only while the stored status equals `expected`.
    ///
    /// Returns the updated record, or `None` when the record is missing or
    /// its status no longer matches.
    async fn update_status_if(
        &self,
        id: &str,
        expected: EnrollmentStatus,
        change: &StatusChange,
    ) -> Result<Option<Enrollment>, StoreError>;

    /// Sets `telegram_joined_at` to `at` only if the enrollment is approved
    /// and the field is unset. Returns whether the field was written.
    async fn set_joined_if_unset(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;
}

/// In-process store used for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentStore {
    enrollments: RwLock<HashMap<String, Enrollment>>,
    courses: RwLock<HashMap<String, Course>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an enrollment.
    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.enrollments
            .write()
            .await
            .insert(enrollment.id.clone(), enrollment);
    }

    /// Creates a pending enrollment with a generated id.
    pub async fn create_enrollment(&self, user_id: &str, course_id: &str) -> Enrollment {
        let enrollment = Enrollment::new_pending(Uuid::new_v4().to_string(), user_id, course_id);
        self.insert_enrollment(enrollment.clone()).await;
        enrollment
    }

    /// Inserts or replaces a course.
    pub async fn insert_course(&self, course: Course) {
        self.courses.write().await.insert(course.id.clone(), course);
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_enrollment(&self, id: &str) -> Result<Option<Enrollment>, StoreError> {
        Ok(self.enrollments.read().await.get(id).cloned())
    }

    async fn find_enrollment_for(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let enrollments = self.enrollments.read().await;
        let found = enrollments
            .values()
            .filter(|e| e.user_id == user_id && e.course_id == course_id)
            .max_by_key(|e| (e.status == EnrollmentStatus::Approved, e.created_at))
            .cloned();
        Ok(found)
    }

    async fn find_course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn update_status_if(
        &self,
        id: &str,
        expected: EnrollmentStatus,
        change: &StatusChange,
    ) -> Result<Option<Enrollment>, StoreError> {
        let mut enrollments = self.enrollments.write().await;
        match enrollments.get_mut(id) {
            Some(enrollment) if enrollment.status == expected => {
                enrollment.apply(change);
                Ok(Some(enrollment.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_joined_if_unset(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut enrollments = self.enrollments.write().await;
        match enrollments.get_mut(id) {
            Some(enrollment)
                if enrollment.status == EnrollmentStatus::Approved
                    && enrollment.telegram_joined_at.is_none() =>
            {
                enrollment.telegram_joined_at = Some(at);
                enrollment.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
