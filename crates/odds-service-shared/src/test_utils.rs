//! Test sinks for access-log assertions.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::sink::{LogEntry, LogSink, Severity, SinkError};

/// Sink that keeps every delivered entry in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(Severity, LogEntry)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn severities(&self) -> Vec<Severity> {
        self.lock().iter().map(|(s, _)| *s).collect()
    }

    /// Wait until at least `count` entries arrived (up to one second), then
    /// return everything recorded so far.
    ///
    /// Entries are delivered from a spawned task, so tests must wait for them.
    pub async fn wait_for(&self, count: usize) -> Vec<LogEntry> {
        for _ in 0..100 {
            if self.lock().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.entries()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Severity, LogEntry)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    async fn send(&self, severity: Severity, entry: &str) -> Result<(), SinkError> {
        let entry: LogEntry = serde_json::from_str(entry)?;
        self.lock().push((severity, entry));
        Ok(())
    }
}

/// Sink that rejects every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingSink;

#[async_trait]
impl LogSink for RejectingSink {
    async fn send(&self, _severity: Severity, _entry: &str) -> Result<(), SinkError> {
        Err(SinkError::Rejected { status: 503 })
    }
}
