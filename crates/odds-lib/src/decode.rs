//! Conversion of raw store records into [`Item`]s.

use serde_dynamo::from_item;

use crate::error::{Error, Result};
use crate::model::Item;
use crate::store::RawRecord;

/// Decode a full result set.
///
/// Decoding is all-or-nothing: the first malformed record fails the whole
/// collection and no items are returned.
pub fn decode_items(records: Vec<RawRecord>) -> Result<Vec<Item>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            from_item(record).map_err(|source| Error::Decode { index, source })
        })
        .collect()
}
