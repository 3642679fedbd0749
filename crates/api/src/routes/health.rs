//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::{AppState, StoreBackend};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: StoreHealth,
}

/// Record store health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreHealth {
    pub configured: bool,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn probe_store(backend: &StoreBackend) -> StoreHealth {
    match backend {
        StoreBackend::Configured(services) => {
            let start = std::time::Instant::now();
            let result = services.store.ping().await;
            let latency_ms = start.elapsed().as_millis() as u64;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Record store health check failed");
            }
            StoreHealth {
                configured: true,
                connected: result.is_ok(),
                latency_ms: result.is_ok().then_some(latency_ms),
            }
        }
        StoreBackend::NotConfigured => StoreHealth {
            configured: false,
            connected: false,
            latency_ms: None,
        },
    }
}

/// Full health check endpoint.
///
/// Reports `degraded` (still 200) when no store is configured, since the
/// process itself is healthy; an unreachable store answers 503.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = probe_store(&state.backend).await;

    let (code, status) = match (store.configured, store.connected) {
        (true, true) => (StatusCode::OK, "healthy"),
        (false, _) => (StatusCode::OK, "degraded"),
        (true, false) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
    };

    (code, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK only when a configured store answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let store = probe_store(&state.backend).await;

    if store.connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
