//! Enrollment approval lifecycle.
//!
//! `PENDING` moves once to `APPROVED` or `REJECTED`. The joined timestamp
//! is set at most once on an approved enrollment. Every write is a
//! conditional update against the store, so concurrent admins or concurrent
//! join attempts cannot both win.

use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::EnrollmentError;
use crate::models::{Enrollment, EnrollmentStatus, StatusChange};
use crate::store::EnrollmentStore;

/// Service owning enrollment status transitions and the joined flag.
#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<dyn EnrollmentStore>,
    allow_status_override: bool,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self {
            store,
            allow_status_override: false,
        }
    }

    /// Enables the audited re-transition of terminal enrollments.
    pub fn with_status_override(mut self, allowed: bool) -> Self {
        self.allow_status_override = allowed;
        self
    }

    /// Loads an enrollment.
    pub async fn get(&self, enrollment_id: &str) -> Result<Enrollment, EnrollmentError> {
        self.store
            .find_enrollment(enrollment_id)
            .await?
            .ok_or(EnrollmentError::NotFound)
    }

    /// Moves a pending enrollment to `APPROVED` or `REJECTED`.
    ///
    /// Rejections require a non-blank reason.
    pub async fn transition(
        &self,
        enrollment_id: &str,
        new_status: EnrollmentStatus,
        actor_id: &str,
        reason: Option<&str>,
    ) -> Result<Enrollment, EnrollmentError> {
        let change = build_change(new_status, actor_id, reason)?;
        let current = self.get(enrollment_id).await?;

        if current.status != EnrollmentStatus::Pending {
            return Err(EnrollmentError::InvalidTransition {
                from: current.status,
                to: new_status,
            });
        }

        let updated = self
            .apply_if(enrollment_id, EnrollmentStatus::Pending, &change)
            .await?;

        counter!("enrollment_transitions_total", "status" => new_status.as_str()).increment(1);
        info!(
            enrollment_id = %enrollment_id,
            actor_id = %actor_id,
            status = %new_status,
            "Enrollment status changed"
        );

        Ok(updated)
    }

    /// Re-transitions a terminal enrollment (`APPROVED` <-> `REJECTED`).
    ///
    /// Only available when enabled in configuration; every use is logged as
    /// an audit event.
    pub async fn override_transition(
        &self,
        enrollment_id: &str,
        new_status: EnrollmentStatus,
        actor_id: &str,
        reason: Option<&str>,
    ) -> Result<Enrollment, EnrollmentError> {
        if !self.allow_status_override {
            return Err(EnrollmentError::Forbidden(
                "Status override is disabled".to_string(),
            ));
        }

        let change = build_change(new_status, actor_id, reason)?;
        let current = self.get(enrollment_id).await?;

        if current.status == EnrollmentStatus::Pending || current.status == new_status {
            return Err(EnrollmentError::InvalidTransition {
                from: current.status,
                to: new_status,
            });
        }

        let updated = self
            .apply_if(enrollment_id, current.status, &change)
            .await?;

        counter!("enrollment_status_overrides_total", "status" => new_status.as_str())
            .increment(1);
        warn!(
            audit = true,
            enrollment_id = %enrollment_id,
            actor_id = %actor_id,
            previous_status = %current.status,
            status = %new_status,
            "Enrollment status overridden"
        );

        Ok(updated)
    }

    /// Records that the user exercised channel access.
    ///
    /// Returns `true` when this call wrote the timestamp and `false` when it
    /// was already set. Both outcomes are successes.
    pub async fn mark_joined(&self, enrollment_id: &str) -> Result<bool, EnrollmentError> {
        let enrollment = self.get(enrollment_id).await?;

        if enrollment.status != EnrollmentStatus::Approved {
            return Err(EnrollmentError::NotApproved);
        }
        if enrollment.has_joined() {
            return Ok(false);
        }

        if self
            .store
            .set_joined_if_unset(enrollment_id, Utc::now())
            .await?
        {
            info!(enrollment_id = %enrollment_id, "Telegram join recorded");
            return Ok(true);
        }

        // The conditional write was skipped; find out why.
        let latest = self.get(enrollment_id).await?;
        if latest.has_joined() {
            Ok(false)
        } else {
            Err(EnrollmentError::NotApproved)
        }
    }

    async fn apply_if(
        &self,
        enrollment_id: &str,
        expected: EnrollmentStatus,
        change: &StatusChange,
    ) -> Result<Enrollment, EnrollmentError> {
        if let Some(updated) = self
            .store
            .update_status_if(enrollment_id, expected, change)
            .await?
        {
            return Ok(updated);
        }

        // Lost a race with another writer.
        let latest = self.get(enrollment_id).await?;
        Err(EnrollmentError::InvalidTransition {
            from: latest.status,
            to: change.status,
        })
    }
}

fn build_change(
    new_status: EnrollmentStatus,
    actor_id: &str,
    reason: Option<&str>,
) -> Result<StatusChange, EnrollmentError> {
    if !new_status.is_terminal() {
        return Err(EnrollmentError::Validation(
            "Invalid status. Must be APPROVED or REJECTED".to_string(),
        ));
    }
    if actor_id.trim().is_empty() {
        return Err(EnrollmentError::Validation(
            "Actor id is required".to_string(),
        ));
    }

    let rejection_reason = match new_status {
        EnrollmentStatus::Rejected => {
            let reason = shared::validation::non_blank(reason).ok_or_else(|| {
                EnrollmentError::Validation("Rejection reason is required".to_string())
            })?;
            shared::validation::validate_reason(reason).map_err(|e| {
                EnrollmentError::Validation(
                    e.message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid rejection reason".to_string()),
                )
            })?;
            Some(reason.to_string())
        }
        _ => None,
    };

    Ok(StatusChange {
        status: new_status,
        actor_id: actor_id.to_string(),
        rejection_reason,
        at: Utc::now(),
    })
}
