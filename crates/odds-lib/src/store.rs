//! Record store abstraction.
//!
//! The planner only sees [`RecordStore`]; the DynamoDB client lives in
//! [`crate::dynamo`] and tests substitute an in-memory store.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::StoreError;
use crate::model::TableStatus;

/// One record as returned by the store, before decoding.
pub type RawRecord = HashMap<String, AttributeValue>;

/// Attribute holding the partition key.
pub const PARTITION_ATTRIBUTE: &str = "id";

/// Attribute holding the sort key / market name.
pub const KEY_ATTRIBUTE: &str = "key";

/// Equality filter applied during a full-table scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    pub attribute: String,
    pub value: String,
}

impl ScanFilter {
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Read primitives offered by the backing table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Indexed lookup of every record in `partition`, optionally narrowed to
    /// a single sort-key value.
    async fn query(&self, partition: &str, sort: Option<&str>)
        -> Result<Vec<RawRecord>, StoreError>;

    /// Full-table read, optionally keeping only records that match `filter`.
    async fn scan(&self, filter: Option<&ScanFilter>) -> Result<Vec<RawRecord>, StoreError>;

    /// Table metadata without reading any records.
    async fn describe(&self) -> Result<TableStatus, StoreError>;
}
