use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{AccessGateway, EnrollmentService, TokenSettings};
use domain::store::EnrollmentStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{access, enrollments, health};

/// Services available once a record store is configured.
#[derive(Clone)]
pub struct AccessServices {
    pub store: Arc<dyn EnrollmentStore>,
    pub enrollments: EnrollmentService,
    pub gateway: AccessGateway,
}

impl AccessServices {
    pub fn new(store: Arc<dyn EnrollmentStore>, config: &Config) -> Self {
        let enrollments = EnrollmentService::new(store.clone())
            .with_status_override(config.access.allow_status_override);
        let tokens = TokenSettings::new(
            config.access.signing_secret.clone(),
            config.access.token_ttl_secs,
            config.access.public_base_url.clone(),
        );
        let gateway = AccessGateway::new(store.clone(), enrollments.clone(), tokens);

        Self {
            store,
            enrollments,
            gateway,
        }
    }
}

/// Whether the record store is available to handlers.
#[derive(Clone)]
pub enum StoreBackend {
    Configured(AccessServices),
    NotConfigured,
}

impl StoreBackend {
    /// Returns the services, or a 503 error when no store is configured.
    pub fn services(&self) -> Result<&AccessServices, ApiError> {
        match self {
            StoreBackend::Configured(services) => Ok(services),
            StoreBackend::NotConfigured => Err(ApiError::ServiceUnavailable(
                "Record store is not configured".into(),
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: StoreBackend,
}

pub fn create_app(config: Config, store: Option<Arc<dyn EnrollmentStore>>) -> Router {
    let config = Arc::new(config);

    let backend = match store {
        Some(store) => StoreBackend::Configured(AccessServices::new(store, &config)),
        None => {
            tracing::warn!("No record store configured; access endpoints will answer 503");
            StoreBackend::NotConfigured
        }
    };

    let state = AppState {
        config: config.clone(),
        backend,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Access routes (user-facing)
    let access_routes = Router::new()
        .route("/api/v1/access/telegram-link", post(access::request_access))
        .route("/api/v1/access/tokens", post(access::issue_access_link))
        .route("/api/v1/access/telegram", get(access::redeem_access_token));

    // Admin routes
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/enrollments/status",
            post(enrollments::transition_enrollment),
        )
        .route(
            "/api/v1/admin/enrollments/status/override",
            post(enrollments::override_enrollment_status),
        );

    // Public routes
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(access_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
