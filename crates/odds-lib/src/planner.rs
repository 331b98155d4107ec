//! Query planning: choosing between an indexed query and a filtered scan.
//!
//! The partition key (`id`) is the only indexed access path. Searches that
//! carry an `id` are answered with a query; searches that carry only a
//! `key` need a full scan with a filter. The scan is the expensive path and
//! is never used when an `id` is available.

use std::fmt;

use tracing::{debug, error};

use crate::decode::decode_items;
use crate::error::{Error, Result};
use crate::model::{Item, TableStatus};
use crate::store::{RecordStore, ScanFilter, KEY_ATTRIBUTE};
use crate::validate::{SearchParams, Validate};
use crate::StoreError;

/// Retrieval strategy chosen for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Indexed query on `id`, optionally narrowed by `key`.
    Query { id: String, key: Option<String> },
    /// Full scan keeping records whose `key` equals the value.
    Scan { key: String },
}

impl Strategy {
    /// Select the strategy for a set of search parameters.
    ///
    /// Depends only on which parameters are present.
    pub fn select(params: &SearchParams) -> Result<Self> {
        match (params.id(), params.key()) {
            (Some(id), key) => Ok(Strategy::Query {
                id: id.to_string(),
                key: key.map(String::from),
            }),
            (None, Some(key)) => Ok(Strategy::Scan {
                key: key.to_string(),
            }),
            (None, None) => Err(Error::MissingSearchParameters),
        }
    }

    /// Validate the parameters, then select a strategy.
    ///
    /// Only input that would actually reach the store yields a strategy.
    pub fn plan(params: &SearchParams) -> Result<Self> {
        params.validate()?;
        Self::select(params)
    }

    /// Short label used for logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Query { key: Some(_), .. } => "query_id_key",
            Strategy::Query { key: None, .. } => "query_id",
            Strategy::Scan { .. } => "scan_key",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validate, plan, and execute a search.
///
/// Invalid input is rejected before the store is touched. An empty result
/// is reported as [`Error::NotFound`].
pub async fn search(store: &dyn RecordStore, params: &SearchParams) -> Result<Vec<Item>> {
    let strategy = Strategy::plan(params)?;
    debug!(strategy = %strategy, "executing search");

    let records = match &strategy {
        Strategy::Query { id, key } => store.query(id, key.as_deref()).await,
        Strategy::Scan { key } => {
            let filter = ScanFilter::equals(KEY_ATTRIBUTE, key.as_str());
            store.scan(Some(&filter)).await
        }
    }
    .map_err(|e| {
        error!(strategy = %strategy, error = %e, "store call failed");
        e
    })?;

    if records.is_empty() {
        return Err(Error::NotFound);
    }

    decode_items(records).map_err(|e| {
        error!(strategy = %strategy, error = %e, "failed to decode search results");
        e
    })
}

/// Read every record with an unfiltered scan.
///
/// An empty table is a successful, empty list.
pub async fn list_all(store: &dyn RecordStore) -> Result<Vec<Item>> {
    let records = store.scan(None).await.map_err(|e| {
        error!(error = %e, "full table scan failed");
        e
    })?;

    decode_items(records).map_err(|e| {
        error!(error = %e, "failed to decode table contents");
        e
    })
}

/// Fetch table metadata only.
pub async fn table_status(store: &dyn RecordStore) -> std::result::Result<TableStatus, StoreError> {
    store.describe().await.map_err(|e| {
        error!(error = %e, "describe table failed");
        e
    })
}
