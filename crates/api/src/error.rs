use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::errors::{AccessError, EnrollmentError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {} invalid field(s)", .0.len())]
    InvalidFields(Vec<ValidationDetail>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
    #[serde(skip)]
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg, None)
            }
            ApiError::InvalidFields(details) => {
                let message = validation_message(&details);
                (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    message,
                    Some(details),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            success: false,
            error: message,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Record store unavailable");
                ApiError::ServiceUnavailable("Record store unavailable".into())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Validation(msg) => ApiError::Validation(msg),
            AccessError::EnrollmentNotFound
            | AccessError::CourseNotFound
            | AccessError::LinkUnavailable => ApiError::NotFound(err.to_string()),
            AccessError::Forbidden | AccessError::NotApproved | AccessError::InvalidToken(_) => {
                ApiError::Forbidden(err.to_string())
            }
            AccessError::CourseMismatch => ApiError::BadRequest(err.to_string()),
            AccessError::Store(e) => e.into(),
        }
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::NotFound => ApiError::NotFound(err.to_string()),
            EnrollmentError::Forbidden(msg) => ApiError::Forbidden(msg),
            EnrollmentError::NotApproved => ApiError::Forbidden(err.to_string()),
            EnrollmentError::CourseMismatch => ApiError::BadRequest(err.to_string()),
            EnrollmentError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            EnrollmentError::Validation(msg) => ApiError::Validation(msg),
            EnrollmentError::Store(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: camel_case(field),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                    code: e.code.to_string(),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::InvalidFields(details)
    }
}

/// Summarizes field errors; missing fields are listed together.
fn validation_message(details: &[ValidationDetail]) -> String {
    let all_missing =
        !details.is_empty() && details.iter().all(|d| d.code == shared::validation::REQUIRED);
    if all_missing {
        let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
        return format!("Missing required fields: {}", fields.join(", "));
    }

    match details {
        [single] => format!("{}: {}", single.field, single.message),
        many => format!("{} validation errors", many.len()),
    }
}

/// Converts a struct field name to its JSON (camelCase) spelling.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::access_token::TokenError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::InvalidFields(vec![]), StatusCode::BAD_REQUEST),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::NotFound("Enrollment not found".into()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Enrollment not found");
        assert_eq!(body["code"], "not_found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::Internal("connection refused on 10.0.0.3".into()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "An internal error occurred");
        assert_eq!(body["code"], "internal_error");
    }

    #[test]
    fn test_access_error_mapping() {
        let status = |e: AccessError| ApiError::from(e).into_response().status();

        assert_eq!(status(AccessError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AccessError::EnrollmentNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(AccessError::CourseNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(AccessError::LinkUnavailable), StatusCode::NOT_FOUND);
        assert_eq!(status(AccessError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status(AccessError::NotApproved), StatusCode::FORBIDDEN);
        assert_eq!(
            status(AccessError::InvalidToken(TokenError::Expired)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status(AccessError::CourseMismatch), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(AccessError::Store(StoreError::Query("boom".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AccessError::Store(StoreError::Unavailable("down".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_token_errors_share_one_message() {
        let expired = ApiError::from(AccessError::InvalidToken(TokenError::Expired));
        let forged = ApiError::from(AccessError::InvalidToken(TokenError::BadSignature));
        assert_eq!(expired.to_string(), forged.to_string());
    }

    #[test]
    fn test_enrollment_error_mapping() {
        use domain::models::EnrollmentStatus;

        let error = ApiError::from(EnrollmentError::InvalidTransition {
            from: EnrollmentStatus::Approved,
            to: EnrollmentStatus::Rejected,
        });
        assert!(matches!(error, ApiError::Conflict(_)));

        let error = ApiError::from(EnrollmentError::Validation("reason".into()));
        assert!(matches!(error, ApiError::Validation(_)));

        let error = ApiError::from(EnrollmentError::NotFound);
        assert!(matches!(error, ApiError::NotFound(_)));

        let error = ApiError::from(EnrollmentError::Forbidden("disabled".into()));
        assert!(matches!(error, ApiError::Forbidden(msg) if msg == "disabled"));
    }

    #[tokio::test]
    async fn test_validation_errors_conversion() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("identifier_length");
        err.message = Some("Identifier cannot exceed 128 characters".into());
        errors.add("course_id", err);

        let api_error = ApiError::from(errors);
        let body = body_json(api_error.into_response()).await;
        assert_eq!(body["code"], "validation_error");
        assert_eq!(body["error"], "courseId: Identifier cannot exceed 128 characters");
        assert_eq!(body["details"][0]["field"], "courseId");
    }

    #[test]
    fn test_missing_fields_listed_together() {
        let mut errors = validator::ValidationErrors::new();
        for field in ["enrollment_id", "course_id"] {
            let mut err = validator::ValidationError::new(shared::validation::REQUIRED);
            err.message = Some("Identifier is required".into());
            errors.add(field, err);
        }

        match ApiError::from(errors) {
            ApiError::InvalidFields(details) => assert_eq!(
                validation_message(&details),
                "Missing required fields: courseId, enrollmentId"
            ),
            other => panic!("Expected InvalidFields, got {:?}", other),
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("enrollment_id"), "enrollmentId");
        assert_eq!(camel_case("status"), "status");
        assert_eq!(camel_case("rejection_reason"), "rejectionReason");
    }
}
