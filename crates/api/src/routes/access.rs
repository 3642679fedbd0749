//! Telegram channel access endpoints.

use axum::{
    extract::{RawQuery, State},
    Json,
};
use domain::models::{IssueAccessLinkResponse, RequestAccessRequest, RequestAccessResponse};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Returns the Telegram link for an approved enrollment.
///
/// POST /api/v1/access/telegram-link
pub async fn request_access(
    State(state): State<AppState>,
    Json(request): Json<RequestAccessRequest>,
) -> Result<Json<RequestAccessResponse>, ApiError> {
    let services = state.backend.services()?;
    request.validate()?;

    let grant = services
        .gateway
        .request_access(&request.user_id, &request.course_id, &request.enrollment_id)
        .await?;

    Ok(Json(grant.into()))
}

/// Issues a signed, time-limited access link.
///
/// POST /api/v1/access/tokens
pub async fn issue_access_link(
    State(state): State<AppState>,
    Json(request): Json<RequestAccessRequest>,
) -> Result<Json<IssueAccessLinkResponse>, ApiError> {
    let services = state.backend.services()?;
    request.validate()?;

    let link = services
        .gateway
        .issue_access_link(&request.user_id, &request.course_id, &request.enrollment_id)
        .await?;

    Ok(Json(link.into()))
}

/// Redeems a signed access link.
///
/// GET /api/v1/access/telegram?courseId=..&userId=..&expiresAt=..&signature=..
pub async fn redeem_access_token(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<RequestAccessResponse>, ApiError> {
    let services = state.backend.services()?;

    let grant = services
        .gateway
        .redeem_access_token(query.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(grant.into()))
}
