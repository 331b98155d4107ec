//! In-memory record store for planner and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::StoreError;
use crate::model::TableStatus;
use crate::store::{RawRecord, RecordStore, ScanFilter, KEY_ATTRIBUTE, PARTITION_ATTRIBUTE};

/// Table name reported by [`FakeStore::describe`].
pub const FAKE_TABLE_NAME: &str = "odds";

/// Build a raw record in the table's layout.
pub fn odds_record(id: &str, key: &str, outcomes: &[(&str, &str)]) -> RawRecord {
    let outcomes = outcomes
        .iter()
        .map(|(name, price)| {
            AttributeValue::M(HashMap::from([
                ("name".to_string(), AttributeValue::S(name.to_string())),
                ("price".to_string(), AttributeValue::S(price.to_string())),
            ]))
        })
        .collect();

    HashMap::from([
        (PARTITION_ATTRIBUTE.to_string(), AttributeValue::S(id.to_string())),
        (KEY_ATTRIBUTE.to_string(), AttributeValue::S(key.to_string())),
        ("outcomes".to_string(), AttributeValue::L(outcomes)),
    ])
}

/// Store backed by a fixed record list, counting every call.
#[derive(Debug, Default)]
pub struct FakeStore {
    records: Vec<RawRecord>,
    failure: Option<String>,
    queries: AtomicUsize,
    scans: AtomicUsize,
    describes: AtomicUsize,
}

impl FakeStore {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn query_calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn scan_calls(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.describes.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.query_calls() + self.scan_calls() + self.describe_calls()
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::new(operation, message.clone())),
            None => Ok(()),
        }
    }
}

fn string_attr<'a>(record: &'a RawRecord, name: &str) -> Option<&'a str> {
    record.get(name).and_then(|v| v.as_s().ok()).map(String::as_str)
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn query(
        &self,
        partition: &str,
        sort: Option<&str>,
    ) -> Result<Vec<RawRecord>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check("Query")?;
        Ok(self
            .records
            .iter()
            .filter(|r| string_attr(r, PARTITION_ATTRIBUTE) == Some(partition))
            .filter(|r| sort.is_none() || string_attr(r, KEY_ATTRIBUTE) == sort)
            .cloned()
            .collect())
    }

    async fn scan(&self, filter: Option<&ScanFilter>) -> Result<Vec<RawRecord>, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.check("Scan")?;
        Ok(self
            .records
            .iter()
            .filter(|r| match filter {
                Some(f) => string_attr(r, &f.attribute) == Some(f.value.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn describe(&self) -> Result<TableStatus, StoreError> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        self.check("DescribeTable")?;
        Ok(TableStatus {
            table: FAKE_TABLE_NAME.to_string(),
            record_count: self.records.len() as i64,
        })
    }
}
