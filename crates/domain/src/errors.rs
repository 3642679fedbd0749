//! Domain error types.

use shared::access_token::TokenError;
use thiserror::Error;

use crate::models::EnrollmentStatus;

/// Failure of the record store collaborator.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store query failed: {0}")]
    Query(String),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Errors raised by the enrollment state machine.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Enrollment not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Enrollment not approved yet")]
    NotApproved,

    #[error("Course ID mismatch")]
    CourseMismatch,

    #[error("Cannot change enrollment status from {from} to {to}")]
    InvalidTransition {
        from: EnrollmentStatus,
        to: EnrollmentStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the access gateway.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Enrollment not found")]
    EnrollmentNotFound,

    #[error("Course not found")]
    CourseNotFound,

    #[error("Unauthorized access")]
    Forbidden,

    #[error("Enrollment not approved yet")]
    NotApproved,

    #[error("Course ID mismatch")]
    CourseMismatch,

    #[error("Telegram group link not configured for this course")]
    LinkUnavailable,

    #[error("Access link is invalid or expired")]
    InvalidToken(#[source] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EnrollmentError> for AccessError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::NotFound => AccessError::EnrollmentNotFound,
            EnrollmentError::Forbidden(_) => AccessError::Forbidden,
            EnrollmentError::NotApproved => AccessError::NotApproved,
            EnrollmentError::CourseMismatch => AccessError::CourseMismatch,
            EnrollmentError::Validation(msg) => AccessError::Validation(msg),
            EnrollmentError::InvalidTransition { from, to } => AccessError::Store(
                StoreError::InvalidRecord(format!("unexpected transition {} -> {}", from, to)),
            ),
            EnrollmentError::Store(e) => AccessError::Store(e),
        }
    }
}
