//! Integration tests for the admin enrollment status endpoints.
//!
//! Run with: cargo test --test enrollments_integration

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, create_unconfigured_app, json_request, parse_response_body, seed_enrollment,
    test_config,
};
use domain::models::EnrollmentStatus;
use domain::store::{EnrollmentStore, InMemoryEnrollmentStore};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

const STATUS_URI: &str = "/api/v1/admin/enrollments/status";
const OVERRIDE_URI: &str = "/api/v1/admin/enrollments/status/override";

async fn store_with(status: EnrollmentStatus) -> Arc<InMemoryEnrollmentStore> {
    let store = Arc::new(InMemoryEnrollmentStore::new());
    seed_enrollment(&store, "E1", "user42", "course7", status).await;
    store
}

async fn stored_status(store: &InMemoryEnrollmentStore) -> EnrollmentStatus {
    store.find_enrollment("E1").await.unwrap().unwrap().status
}

#[tokio::test]
async fn test_approve_pending_enrollment() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E1", "status": "APPROVED", "adminId": "admin1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Enrollment approved successfully");
    assert_eq!(body["enrollment"]["status"], "APPROVED");
    assert_eq!(body["enrollment"]["approvedBy"], "admin1");

    assert_eq!(stored_status(&store).await, EnrollmentStatus::Approved);
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E1", "status": "REJECTED", "adminId": "admin1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["error"], "Rejection reason is required");

    assert_eq!(stored_status(&store).await, EnrollmentStatus::Pending);
}

#[tokio::test]
async fn test_reject_with_reason_locks_status() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({
                "enrollmentId": "E1",
                "status": "REJECTED",
                "adminId": "admin1",
                "rejectionReason": "Payment not received"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Enrollment rejected successfully");
    assert_eq!(body["enrollment"]["rejectionReason"], "Payment not received");

    // A second decision on the same enrollment conflicts
    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E1", "status": "APPROVED", "adminId": "admin2"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["code"], "conflict");

    assert_eq!(stored_status(&store).await, EnrollmentStatus::Rejected);
}

#[tokio::test]
async fn test_invalid_target_status() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store);

    for status in ["CANCELLED", "PENDING", "approved"] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                STATUS_URI,
                json!({"enrollmentId": "E1", "status": status, "adminId": "admin1"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "status {}", status);
        let body = parse_response_body(response).await;
        assert_eq!(
            body["error"],
            "status: Invalid status. Must be APPROVED or REJECTED"
        );
    }
}

#[tokio::test]
async fn test_missing_admin_id() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store);

    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E1", "status": "APPROVED"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Missing required fields: adminId");
}

#[tokio::test]
async fn test_actor_id_alias() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store);

    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E1", "status": "APPROVED", "actorId": "admin7"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["enrollment"]["approvedBy"], "admin7");
}

#[tokio::test]
async fn test_unknown_enrollment() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let app = create_test_app(test_config(), store);

    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E404", "status": "APPROVED", "adminId": "admin1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Enrollment not found");
}

#[tokio::test]
async fn test_status_change_store_not_configured() {
    let app = create_unconfigured_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            STATUS_URI,
            json!({"enrollmentId": "E1", "status": "APPROVED", "adminId": "admin1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Status override
// ============================================================================

#[tokio::test]
async fn test_override_disabled_by_default() {
    let store = store_with(EnrollmentStatus::Approved).await;
    let app = create_test_app(test_config(), store.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            OVERRIDE_URI,
            json!({
                "enrollmentId": "E1",
                "status": "REJECTED",
                "adminId": "admin1",
                "rejectionReason": "Refunded"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(stored_status(&store).await, EnrollmentStatus::Approved);
}

#[tokio::test]
async fn test_override_approved_to_rejected() {
    let store = store_with(EnrollmentStatus::Approved).await;
    let mut config = test_config();
    config.access.allow_status_override = true;
    let app = create_test_app(config, store.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            OVERRIDE_URI,
            json!({
                "enrollmentId": "E1",
                "status": "REJECTED",
                "adminId": "admin1",
                "reason": "Refunded"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Enrollment rejected successfully");
    assert_eq!(body["enrollment"]["rejectionReason"], "Refunded");

    assert_eq!(stored_status(&store).await, EnrollmentStatus::Rejected);
}

#[tokio::test]
async fn test_override_pending_is_conflict() {
    let store = store_with(EnrollmentStatus::Pending).await;
    let mut config = test_config();
    config.access.allow_status_override = true;
    let app = create_test_app(config, store.clone());

    let response = app
        .oneshot(json_request(
            Method::POST,
            OVERRIDE_URI,
            json!({"enrollmentId": "E1", "status": "APPROVED", "adminId": "admin1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(stored_status(&store).await, EnrollmentStatus::Pending);
}
