//! Common test utilities for integration tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! the in-memory record store, so no database is required.

// Not every helper is used by every integration test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use course_access_api::{
    app::create_app,
    config::{
        AccessConfig, Config, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
        StoreBackendKind, StoreConfig,
    },
};
use domain::models::{Course, Enrollment, EnrollmentStatus};
use domain::store::{EnrollmentStore, InMemoryEnrollmentStore};
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-signing-secret";
pub const TEST_BASE_URL: &str = "https://learn.example.com";

/// Test configuration backed by the in-memory store.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        store: StoreConfig {
            backend: StoreBackendKind::Memory,
        },
        database: DatabaseConfig::default(),
        access: AccessConfig {
            signing_secret: TEST_SECRET.to_string(),
            token_ttl_secs: 86_400,
            public_base_url: TEST_BASE_URL.to_string(),
            allow_status_override: false,
        },
        security: SecurityConfig::default(),
    }
}

/// Creates the application router over the given store.
pub fn create_test_app(config: Config, store: Arc<InMemoryEnrollmentStore>) -> Router {
    let store: Arc<dyn EnrollmentStore> = store;
    create_app(config, Some(store))
}

/// Creates the application router with no record store.
pub fn create_unconfigured_app() -> Router {
    let mut config = test_config();
    config.store.backend = StoreBackendKind::Disabled;
    create_app(config, None)
}

/// Seeds a course with an optional Telegram group link.
pub async fn seed_course(store: &InMemoryEnrollmentStore, course_id: &str, link: Option<&str>) {
    store
        .insert_course(Course {
            id: course_id.to_string(),
            title: format!("Course {}", course_id),
            telegram_group_link: link.map(str::to_string),
        })
        .await;
}

/// Seeds an enrollment with the given status.
pub async fn seed_enrollment(
    store: &InMemoryEnrollmentStore,
    enrollment_id: &str,
    user_id: &str,
    course_id: &str,
    status: EnrollmentStatus,
) {
    let mut enrollment = Enrollment::new_pending(enrollment_id, user_id, course_id);
    enrollment.status = status;
    if status == EnrollmentStatus::Approved {
        enrollment.approved_by = Some("admin1".to_string());
    }
    store.insert_enrollment(enrollment).await;
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
