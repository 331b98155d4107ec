//! Shared infrastructure for the odds HTTP service.
//!
//! This crate provides the HTTP glue around `odds-lib`:
//!
//! - [`ServiceConfig`]: Environment configuration read once at startup
//! - [`AppState`]: Injected record store and status mode
//! - [`ApiError`]: Mapping of planner outcomes onto status codes and bodies
//! - [`middleware`]: Access logging and fault recovery around every route
//! - [`sink`]: Access-log sinks (Loggly, process log)
//! - [`status_handler`], [`health_live`]/[`health_ready`] probes, and [`metrics`]
//! - [`logging`]: Structured diagnostics setup
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  AccessLogLayer  (one LogEntry per request)               │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  CatchPanicLayer  (panic → 500)                     │  │
//! │  │  ┌──────────────────────────────────────────────┐  │  │
//! │  │  │  handler → odds-lib planner → RecordStore     │  │  │
//! │  │  └──────────────────────────────────────────────┘  │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides in-memory sinks. Enable the
//! `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

pub mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod response;
pub mod sink;
mod state;
mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, LogglyConfig, ServiceConfig, StatusMode};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, record_items_returned, record_search,
    record_search_failed, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, instrument, AccessLogLayer, RequestId};
pub use response::{recover_fault, ApiError, BAD_REQUEST_BODY, FAULT_BODY, NOT_FOUND_BODY};
pub use sink::{sink_from_config, LogEntry, LogSink, LogglySink, Severity, SinkError, TracingSink};
pub use state::AppState;
pub use status::{status_handler, StatusBody};
