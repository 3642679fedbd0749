//! Enrollment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Approval status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    /// Wire representation (`PENDING`, `APPROVED`, `REJECTED`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
        }
    }

    /// Whether the status is final for the normal approval flow.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EnrollmentStatus::Pending)
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown enrollment status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for EnrollmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EnrollmentStatus::Pending),
            "APPROVED" => Ok(EnrollmentStatus::Approved),
            "REJECTED" => Ok(EnrollmentStatus::Rejected),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// One user's purchase of one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Creates a pending enrollment.
    pub fn new_pending(
        id: impl Into<String>,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            course_id: course_id.into(),
            status: EnrollmentStatus::Pending,
            rejection_reason: None,
            approved_by: None,
            telegram_joined_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the user already exercised channel access.
    pub fn has_joined(&self) -> bool {
        self.telegram_joined_at.is_some()
    }

    /// Applies a status change to this record.
    pub fn apply(&mut self, change: &StatusChange) {
        self.status = change.status;
        self.approved_by = Some(change.actor_id.clone());
        self.rejection_reason = match change.status {
            EnrollmentStatus::Rejected => change.rejection_reason.clone(),
            _ => None,
        };
        self.updated_at = change.at;
    }
}

/// A status change to apply to an enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: EnrollmentStatus,
    pub actor_id: String,
    pub rejection_reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// Request body for changing an enrollment's status.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEnrollmentRequest {
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub enrollment_id: String,

    #[serde(default)]
    #[validate(custom(function = "validate_target_status"))]
    pub status: String,

    #[serde(default, alias = "actorId")]
    #[validate(custom(function = "shared::validation::validate_identifier"))]
    pub admin_id: String,

    #[serde(default, alias = "reason")]
    pub rejection_reason: Option<String>,
}

fn validate_target_status(status: &str) -> Result<(), validator::ValidationError> {
    match status.parse::<EnrollmentStatus>() {
        Ok(s) if s.is_terminal() => Ok(()),
        _ => {
            let mut err = validator::ValidationError::new("invalid_status");
            err.message = Some("Invalid status. Must be APPROVED or REJECTED".into());
            Err(err)
        }
    }
}

/// Response after changing an enrollment's status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEnrollmentResponse {
    pub success: bool,
    pub message: String,
    pub enrollment: Enrollment,
}

impl TransitionEnrollmentResponse {
    pub fn new(enrollment: Enrollment) -> Self {
        Self {
            success: true,
            message: format!(
                "Enrollment {} successfully",
                enrollment.status.as_str().to_lowercase()
            ),
            enrollment,
        }
    }
}
