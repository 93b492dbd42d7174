// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod reraise;

pub use classifier::ErrorClassifier;
pub use reraise::{TableResultExt, with_table_errors, with_transaction_errors};

use tables_decode::ResponseError;
use tables_error::TableError;

/// Classify a failed table or entity operation with default settings.
///
/// `table_name` enables naming refinement; pass `None` when the call had no
/// table name.
pub fn process_table_error(error: ResponseError, table_name: Option<&str>) -> TableError {
    ErrorClassifier::default().process(error, table_name)
}

/// Classify a failed batch submission with default settings.
pub fn process_transaction_error(error: ResponseError) -> TableError {
    ErrorClassifier::default().process_transaction(error)
}
