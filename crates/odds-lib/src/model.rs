//! Domain records served by the API.

use serde::{Deserialize, Deserializer, Serialize};

/// A single odds record: one market (`key`) for one event (`id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Event identifier; the table's partition key.
    pub id: String,
    /// Market identifier (e.g. "moneyline"); the table's sort key.
    pub key: String,
    /// Priced outcomes in store order. Absent and `NULL` both read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outcomes: Vec<Outcome>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Outcome>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Outcome>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named outcome and its quoted price.
///
/// The price stays as the text the store holds. It is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: String,
}

/// Item-count metadata for the backing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table: String,
    #[serde(rename = "recordCount")]
    pub record_count: i64,
}
