//! Core library for the sports-odds read API.
//!
//! This crate holds everything between an HTTP handler and the table store:
//!
//! - [`SearchParams`] and the [`Validate`] trait: syntactic checks on untrusted input
//! - [`planner`]: strategy selection (indexed query vs. filtered scan) and execution
//! - [`decode_items`]: atomic conversion of raw records into [`Item`]s
//! - [`RecordStore`]: the store seam, with [`DynamoStore`] as the production backend
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides an in-memory [`RecordStore`] that counts
//! calls. Enable the `test-utils` feature to access it from dependent crates.

mod decode;
pub mod dynamo;
mod error;
mod model;
pub mod planner;
pub mod store;
mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use decode::decode_items;
pub use dynamo::{DynamoConfig, DynamoStore};
pub use error::{Error, Result, StoreError, ValidationError};
pub use model::{Item, Outcome, TableStatus};
pub use planner::{list_all, search, table_status, Strategy};
pub use store::{RawRecord, RecordStore, ScanFilter};
pub use validate::{SearchParams, Validate, MAX_ID_LEN, MAX_KEY_LEN};
