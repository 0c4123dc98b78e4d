//! Remote table API client.
//!
//! The remote store is an opaque relational data service exposing table-like
//! collections over HTTP. Every response carries a `{data, error}` envelope;
//! a non-null `error`, a non-2xx status, or a transport failure all count as
//! a failed call from the gateway's point of view.

mod rest;

pub use rest::RestStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from the remote table API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP status.
    #[error("remote returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response envelope carried a non-null error.
    #[error("remote error: {0}")]
    Api(String),

    /// The response body could not be parsed.
    #[error("malformed remote response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Row filter: conjunction of column equality predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter(Vec<(String, Value)>);

impl Filter {
    /// An empty filter (matches all rows).
    #[must_use]
    pub const fn all() -> Self {
        Self(Vec::new())
    }

    /// Add a `column = value` predicate.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((column.into(), value.into()));
        self
    }

    /// The predicates as (column, value) pairs.
    #[must_use]
    pub fn predicates(&self) -> &[(String, Value)] {
        &self.0
    }

    /// Whether a row object satisfies every predicate.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.0
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }
}

/// Result ordering for a select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    /// Ascending order on a column.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending order on a column.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// A select against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQuery {
    pub table: String,
    pub filter: Filter,
    pub order: Option<OrderBy>,
}

impl RemoteQuery {
    /// Select all rows of a table.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            filter: Filter::all(),
            order: None,
        }
    }

    /// Restrict the select with a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Order the result.
    #[must_use]
    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }
}

/// A write against one table.
///
/// Collection writes are per-row upserts keyed by the table's primary key,
/// never delete-all-then-reinsert-all; removals are explicit deletes.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteWrite {
    /// Insert-or-update rows by primary key.
    Upsert { table: String, rows: Vec<Value> },
    /// Delete all rows matching the filter.
    Delete { table: String, filter: Filter },
}

impl RemoteWrite {
    /// Upsert a single serializable row.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the row cannot be encoded.
    pub fn upsert_row<T: Serialize>(
        table: impl Into<String>,
        row: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::Upsert {
            table: table.into(),
            rows: vec![serde_json::to_value(row)?],
        })
    }

    /// Delete rows matching a filter.
    #[must_use]
    pub fn delete(table: impl Into<String>, filter: Filter) -> Self {
        Self::Delete {
            table: table.into(),
            filter,
        }
    }
}

/// Table-oriented remote store operations.
///
/// The production implementation is [`RestStore`]; integration tests
/// substitute a scriptable mock to force outages and control latency.
pub trait RemoteStore: Send + Sync {
    /// Select rows from a table.
    fn select(
        &self,
        query: &RemoteQuery,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>> + Send;

    /// Insert-or-update rows by primary key.
    fn upsert(
        &self,
        table: &str,
        rows: &[Value],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Delete rows matching a filter.
    fn delete(
        &self,
        table: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
