//! Sports-odds read API.
//!
//! # Endpoints
//!
//! - `GET /status`, `GET /jalcanta/status` - System time or table metadata
//! - `GET /jalcanta/all` - Every record in the table
//! - `GET /jalcanta/search?id=&key=` - Query by `id` (optionally `key`), or scan by `key`
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live`, `GET /health/ready` - Probes
//!
//! Every route is wrapped by the access-log and fault-recovery middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, info};

use odds_lib::{list_all, search, Item, SearchParams, Strategy};
use odds_service_shared::{
    failure_reason, health_live, health_ready, instrument, metrics_handler, record_items_returned,
    record_search, record_search_failed, status_handler, ApiError, AppState, LogSink,
};

/// Build the full router with middleware applied.
pub fn build_router(state: AppState, sink: Arc<dyn LogSink>, sink_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/status", get(status_handler))
        .route("/jalcanta/status", get(status_handler))
        .route("/jalcanta/all", get(all_handler))
        .route("/jalcanta/search", get(search_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .with_state(state);

    instrument(routes, sink, sink_timeout)
}

/// Handle `GET /jalcanta/all`.
pub async fn all_handler(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = list_all(state.store()).await.map_err(|e| {
        record_search_failed(failure_reason(&e));
        ApiError::from(e)
    })?;

    record_items_returned(items.len());
    info!(count = items.len(), "listed all records");
    Ok(Json(items))
}

/// Handle `GET /jalcanta/search`.
///
/// A query string that cannot be parsed (e.g. a repeated `id`) is a bad
/// request, the same as a parameter that fails validation.
pub async fn search_handler(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let params = match query {
        Ok(Query(params)) => params.normalized(),
        Err(rejection) => {
            debug!(error = %rejection, "unparseable search query");
            record_search_failed("validation");
            return Err(ApiError::BadRequest);
        }
    };

    let strategy = match Strategy::plan(&params) {
        Ok(strategy) => strategy.label(),
        Err(e) => {
            record_search_failed(failure_reason(&e));
            return Err(ApiError::from(e));
        }
    };
    record_search(strategy);

    let items = search(state.store(), &params).await.map_err(|e| {
        record_search_failed(failure_reason(&e));
        ApiError::from(e)
    })?;

    record_items_returned(items.len());
    info!(strategy, count = items.len(), "search completed");
    Ok(Json(items))
}
