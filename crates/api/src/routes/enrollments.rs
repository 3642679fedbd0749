//! Admin enrollment status endpoints.

use axum::{extract::State, Json};
use domain::models::{EnrollmentStatus, TransitionEnrollmentRequest, TransitionEnrollmentResponse};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Approves or rejects a pending enrollment.
///
/// POST /api/v1/admin/enrollments/status
pub async fn transition_enrollment(
    State(state): State<AppState>,
    Json(request): Json<TransitionEnrollmentRequest>,
) -> Result<Json<TransitionEnrollmentResponse>, ApiError> {
    let services = state.backend.services()?;
    request.validate()?;
    let status = target_status(&request)?;

    let enrollment = services
        .enrollments
        .transition(
            &request.enrollment_id,
            status,
            &request.admin_id,
            request.rejection_reason.as_deref(),
        )
        .await?;

    Ok(Json(TransitionEnrollmentResponse::new(enrollment)))
}

/// Re-transitions an approved or rejected enrollment.
///
/// POST /api/v1/admin/enrollments/status/override
///
/// Answers 403 unless `access.allow_status_override` is enabled.
pub async fn override_enrollment_status(
    State(state): State<AppState>,
    Json(request): Json<TransitionEnrollmentRequest>,
) -> Result<Json<TransitionEnrollmentResponse>, ApiError> {
    let services = state.backend.services()?;
    request.validate()?;
    let status = target_status(&request)?;

    let enrollment = services
        .enrollments
        .override_transition(
            &request.enrollment_id,
            status,
            &request.admin_id,
            request.rejection_reason.as_deref(),
        )
        .await?;

    Ok(Json(TransitionEnrollmentResponse::new(enrollment)))
}

fn target_status(request: &TransitionEnrollmentRequest) -> Result<EnrollmentStatus, ApiError> {
    request
        .status
        .parse()
        .map_err(|e: domain::models::ParseStatusError| ApiError::Validation(e.to_string()))
}
