// SPDX-License-Identifier: MIT OR Apache-2.0
//! Converting transport results at call sites.

use std::future::Future;

use tables_decode::ResponseError;
use tables_error::TableError;

use crate::ErrorClassifier;

/// Map a transport [`Result`] onto [`TableError`] with the default classifier.
pub trait TableResultExt<T> {
    /// Error path for table and entity operations.
    fn map_table_err(self, table_name: Option<&str>) -> Result<T, TableError>;

    /// Error path for batch submissions.
    fn map_transaction_err(self) -> Result<T, TableError>;

    /// Like [`map_table_err`](Self::map_table_err) with an explicit classifier.
    fn map_table_err_with(
        self,
        classifier: &ErrorClassifier,
        table_name: Option<&str>,
    ) -> Result<T, TableError>;
}

impl<T> TableResultExt<T> for Result<T, ResponseError> {
    fn map_table_err(self, table_name: Option<&str>) -> Result<T, TableError> {
        self.map_table_err_with(&ErrorClassifier::default(), table_name)
    }

    fn map_transaction_err(self) -> Result<T, TableError> {
        self.map_err(|e| ErrorClassifier::default().process_transaction(e))
    }

    fn map_table_err_with(
        self,
        classifier: &ErrorClassifier,
        table_name: Option<&str>,
    ) -> Result<T, TableError> {
        self.map_err(|e| classifier.process(e, table_name))
    }
}

/// Await `fut` and route its failure through the table error path.
pub async fn with_table_errors<T, F>(table_name: Option<&str>, fut: F) -> Result<T, TableError>
where
    F: Future<Output = Result<T, ResponseError>>,
{
    fut.await.map_table_err(table_name)
}

/// Await a batch submission and route its failure through the batch error path.
pub async fn with_transaction_errors<T, F>(fut: F) -> Result<T, TableError>
where
    F: Future<Output = Result<T, ResponseError>>,
{
    fut.await.map_transaction_err()
}
