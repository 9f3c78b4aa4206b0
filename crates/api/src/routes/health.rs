use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Upper bound for a single backend ping.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every backend answered, `unhealthy` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Per-backend status: `healthy` or `unhealthy: <reason>`.
    pub services: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /health -- pings every backend concurrently.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checks = state.probes.iter().map(|probe| async move {
        let status = match tokio::time::timeout(PROBE_TIMEOUT, probe.ping()).await {
            Ok(Ok(())) => "healthy".to_string(),
            Ok(Err(e)) => format!("unhealthy: {e}"),
            Err(_) => format!("unhealthy: no response within {PROBE_TIMEOUT:?}"),
        };
        (probe.name(), status)
    });
    let services: BTreeMap<_, _> = futures::future::join_all(checks).await.into_iter().collect();

    let all_healthy = services.values().all(|s| s == "healthy");
    if !all_healthy {
        tracing::warn!(?services, "Health check found unhealthy backends");
    }

    let (status_code, status) = if all_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            services,
        }),
    )
}

/// GET /ready -- the process is up and serving.
async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        timestamp: Utc::now(),
    })
}

/// Mount health routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready))
}
