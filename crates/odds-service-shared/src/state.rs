//! Application state shared by all handlers.

use std::sync::Arc;

use odds_lib::{DynamoStore, RecordStore};

use crate::config::{ServiceConfig, StatusMode};

/// Shared application state for all axum handlers.
///
/// Cheap to clone. The store is injected so that tests can substitute an
/// in-memory implementation.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn RecordStore>,
    status_mode: StatusMode,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, status_mode: StatusMode) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, status_mode }),
        }
    }

    /// Build state backed by DynamoDB. The SDK client is created on first use.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let store = DynamoStore::new(config.store.clone());
        Self::new(Arc::new(store), config.status_mode)
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }

    pub fn status_mode(&self) -> StatusMode {
        self.inner.status_mode
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("status_mode", &self.inner.status_mode)
            .finish_non_exhaustive()
    }
}
