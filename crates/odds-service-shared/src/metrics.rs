//! Prometheus metrics for the odds service.
//!
//! HTTP request metrics are recorded by [`crate::middleware::AccessLogLayer`];
//! this module installs the recorder, serves `/metrics`, and holds the
//! search-level helpers.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// `METRICS_ENABLED`: "false" disables the recorder (default: enabled).
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self { enabled }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("metrics are disabled")]
    Disabled,
    #[error("metrics recorder already initialized")]
    AlreadyInitialized,
    #[error("failed to install metrics recorder: {0}")]
    InstallFailed(String),
}

/// Install the Prometheus recorder. Must be called at most once.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Axum handler for `GET /metrics`.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Count a search by the strategy it was planned with.
pub fn record_search(strategy: &'static str) {
    metrics::counter!("odds_searches_total", "strategy" => strategy).increment(1);
}

/// Count a failed search or listing by reason (e.g. "not_found", "store").
pub fn record_search_failed(reason: &'static str) {
    metrics::counter!("odds_search_failures_total", "reason" => reason).increment(1);
}

/// Record how many items a successful request returned.
pub fn record_items_returned(count: usize) {
    metrics::histogram!("odds_items_returned").record(count as f64);
}

/// Failure label for a library error.
pub fn failure_reason(err: &odds_lib::Error) -> &'static str {
    match err {
        odds_lib::Error::Validation(_) => "validation",
        odds_lib::Error::MissingSearchParameters => "missing_parameters",
        odds_lib::Error::NotFound => "not_found",
        odds_lib::Error::Decode { .. } => "decode",
        odds_lib::Error::Store(_) => "store",
    }
}
