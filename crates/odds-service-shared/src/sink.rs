//! Access-log entries and the sinks that receive them.
//!
//! Delivery is fire-and-forget: [`dispatch`] serializes the entry, hands it
//! to a background task, and returns immediately. Sink failures are logged
//! locally and never reach the client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LogglyConfig;

const LOGGLY_INPUT_URL: &str = "https://logs-01.loggly.com/inputs";

/// One access-log record per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub method: String,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    pub path: String,
    pub status: u16,
}

/// Severity attached to a sink delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Server errors are flagged so they stand out in the aggregator.
    pub fn for_status(status: u16) -> Self {
        if status >= 500 {
            Severity::Error
        } else {
            Severity::Info
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("log sink transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("log sink rejected entry with status {status}")]
    Rejected { status: u16 },

    #[error("log sink did not respond within {0:?}")]
    Timeout(Duration),
}

/// Destination for serialized access-log entries.
#[async_trait]
pub trait LogSink: Send + Sync + 'static {
    async fn send(&self, severity: Severity, entry: &str) -> Result<(), SinkError>;
}

/// Sink that posts entries to Loggly's HTTP inputs endpoint.
#[derive(Debug, Clone)]
pub struct LogglySink {
    client: reqwest::Client,
    url: String,
}

impl LogglySink {
    pub fn new(config: &LogglyConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &LogglyConfig) -> Self {
        Self {
            client,
            url: format!("{}/{}/tag/{}/", LOGGLY_INPUT_URL, config.token, config.tag),
        }
    }
}

#[derive(Serialize)]
struct LogglyMessage<'a> {
    level: &'a str,
    message: &'a str,
}

#[async_trait]
impl LogSink for LogglySink {
    async fn send(&self, severity: Severity, entry: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(&LogglyMessage {
                level: severity.as_str(),
                message: entry,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Sink that writes entries to the process log on the `access_log` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl LogSink for TracingSink {
    async fn send(&self, severity: Severity, entry: &str) -> Result<(), SinkError> {
        match severity {
            Severity::Info => tracing::info!(target: "access_log", entry),
            Severity::Warning => tracing::warn!(target: "access_log", entry),
            Severity::Error => tracing::error!(target: "access_log", entry),
        }
        Ok(())
    }
}

/// Build the configured sink: Loggly when a token is present, the process log otherwise.
pub fn sink_from_config(loggly: Option<&LogglyConfig>) -> Arc<dyn LogSink> {
    match loggly {
        Some(config) => Arc::new(LogglySink::new(config)),
        None => Arc::new(TracingSink),
    }
}

async fn deliver(
    sink: &dyn LogSink,
    entry: &LogEntry,
    timeout: Duration,
) -> Result<(), SinkError> {
    let payload = serde_json::to_string(entry)?;
    tokio::time::timeout(timeout, sink.send(Severity::for_status(entry.status), &payload))
        .await
        .map_err(|_| SinkError::Timeout(timeout))?
}

/// Send `entry` to `sink` in the background.
///
/// Outside a tokio runtime the entry is written to the process log instead.
pub fn dispatch(sink: Arc<dyn LogSink>, entry: LogEntry, timeout: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(e) = deliver(sink.as_ref(), &entry, timeout).await {
                    tracing::warn!(
                        error = %e,
                        method = %entry.method,
                        path = %entry.path,
                        status = entry.status,
                        "failed to deliver access log entry"
                    );
                }
            });
        }
        Err(_) => {
            tracing::warn!(
                method = %entry.method,
                path = %entry.path,
                status = entry.status,
                "no runtime available, access log entry not delivered"
            );
        }
    }
}
