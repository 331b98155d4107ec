//! DynamoDB implementation of [`RecordStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::model::TableStatus;
use crate::store::{RawRecord, RecordStore, ScanFilter, KEY_ATTRIBUTE, PARTITION_ATTRIBUTE};

/// Connection settings for the DynamoDB table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoConfig {
    pub region: String,
    pub table_name: String,
    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local.
    pub endpoint_url: Option<String>,
}

/// DynamoDB-backed record store.
///
/// The SDK client is built on first use. Concurrent first requests share a
/// single initialization; afterwards the client is only read.
pub struct DynamoStore {
    config: DynamoConfig,
    client: OnceCell<Client>,
}

impl DynamoStore {
    pub fn new(config: DynamoConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// Wrap an already-built client.
    pub fn with_client(config: DynamoConfig, client: Client) -> Self {
        Self {
            config,
            client: OnceCell::new_with(Some(client)),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                info!(
                    region = %self.config.region,
                    table = %self.config.table_name,
                    "initializing DynamoDB client"
                );
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(self.config.region.clone()))
                    .load()
                    .await;
                let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared);
                if let Some(endpoint) = &self.config.endpoint_url {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            })
            .await
    }
}

impl std::fmt::Debug for DynamoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoStore")
            .field("config", &self.config)
            .field("initialized", &self.client.initialized())
            .finish()
    }
}

fn store_error<E>(operation: &'static str, err: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::new(operation, DisplayErrorContext(err).to_string())
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn query(
        &self,
        partition: &str,
        sort: Option<&str>,
    ) -> Result<Vec<RawRecord>, StoreError> {
        let client = self.client().await;

        let mut names = HashMap::from([("#id".to_string(), PARTITION_ATTRIBUTE.to_string())]);
        let mut values = HashMap::from([(
            ":id".to_string(),
            AttributeValue::S(partition.to_string()),
        )]);
        let mut condition = String::from("#id = :id");
        if let Some(sort) = sort {
            names.insert("#key".to_string(), KEY_ATTRIBUTE.to_string());
            values.insert(":key".to_string(), AttributeValue::S(sort.to_string()));
            condition.push_str(" AND #key = :key");
        }

        let mut records = Vec::new();
        let mut start_key = None;
        loop {
            let page = client
                .query()
                .table_name(&self.config.table_name)
                .key_condition_expression(&condition)
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| store_error("Query", e))?;

            records.extend(page.items.unwrap_or_default());
            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        debug!(partition, count = records.len(), "query complete");
        Ok(records)
    }

    async fn scan(&self, filter: Option<&ScanFilter>) -> Result<Vec<RawRecord>, StoreError> {
        let client = self.client().await;

        let mut records = Vec::new();
        let mut start_key = None;
        loop {
            let mut request = client
                .scan()
                .table_name(&self.config.table_name)
                .set_exclusive_start_key(start_key);
            if let Some(filter) = filter {
                request = request
                    .filter_expression("#f = :f")
                    .expression_attribute_names("#f", &filter.attribute)
                    .expression_attribute_values(":f", AttributeValue::S(filter.value.clone()));
            }

            let page = request.send().await.map_err(|e| store_error("Scan", e))?;

            records.extend(page.items.unwrap_or_default());
            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        debug!(filtered = filter.is_some(), count = records.len(), "scan complete");
        Ok(records)
    }

    async fn describe(&self) -> Result<TableStatus, StoreError> {
        let output = self
            .client()
            .await
            .describe_table()
            .table_name(&self.config.table_name)
            .send()
            .await
            .map_err(|e| store_error("DescribeTable", e))?;

        let record_count = output
            .table()
            .and_then(|table| table.item_count())
            .unwrap_or_default();

        Ok(TableStatus {
            table: self.config.table_name.clone(),
            record_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DynamoConfig {
        DynamoConfig {
            region: "us-east-1".to_string(),
            table_name: "odds".to_string(),
            endpoint_url: None,
        }
    }

    #[test]
    fn test_client_is_not_built_eagerly() {
        let store = DynamoStore::new(config());
        assert!(!store.client.initialized());
        assert_eq!(store.table_name(), "odds");
    }

    #[test]
    fn test_debug_hides_client() {
        let store = DynamoStore::new(config());
        let debug = format!("{:?}", store);
        assert!(debug.contains("DynamoStore"));
        assert!(debug.contains("initialized: false"));
    }

    #[tokio::test]
    async fn test_client_initialized_once_across_callers() {
        let store = DynamoStore::new(DynamoConfig {
            endpoint_url: Some("http://localhost:8000".to_string()),
            ..config()
        });
        let (a, b) = tokio::join!(store.client(), store.client());
        assert!(std::ptr::eq(a, b));
        assert!(store.client.initialized());
    }
}
