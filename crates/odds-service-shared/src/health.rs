//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use odds_lib::table_status;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,
    pub service: String,
    pub version: String,
    /// Records in the table (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<i64>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            record_count: None,
        }
    }

    pub fn ready(service: &str, version: &str, record_count: i64) -> Self {
        Self {
            record_count: Some(record_count),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// `GET /health/live`: the process is up. Does not touch the store.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: the table is reachable.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match table_status(state.store()).await {
        Ok(table) => (
            StatusCode::OK,
            Json(HealthStatus::ready(service, version, table.record_count)),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus::not_ready(service, version, "store unreachable")),
            )
                .into_response()
        }
    }
}
