//! Tabular warehouse access.
//!
//! A [`WarehouseConnector`] discovers tables in a schema and runs plain
//! `SELECT` queries, returning each result as a [`Table`] tagged with
//! [`SourceKind::Warehouse`](crate::types::SourceKind::Warehouse). One
//! connector is used per session; there is no pooling and no retry.
//!
//! # Feature Flag
//!
//! [`DatabricksConnector`] requires the `warehouse` feature flag. The trait
//! and the statement-result decoding are always available.

mod statement;

#[cfg(feature = "warehouse")]
mod databricks;

pub use statement::{ResultColumn, StatementResult, decode_statement};

#[cfg(feature = "warehouse")]
pub use databricks::{DatabricksConfig, DatabricksConnector};

use crate::error::Result;
use crate::types::Table;

/// A remote SQL warehouse.
pub trait WarehouseConnector: Send + Sync {
    /// Names of the tables in `schema`.
    fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Run `sql` and load the result as a table called `name`.
    fn query(&self, sql: &str, name: &str) -> Result<Table>;

    /// Connector name for logging.
    fn name(&self) -> &str;
}

/// Discovery query for the tables of `schema`.
pub fn show_tables_sql(schema: &str) -> String {
    format!("SHOW TABLES IN {schema}")
}

/// Full-table query, optionally capped at `limit` rows.
pub fn select_sql(schema: &str, table: &str, limit: Option<usize>) -> String {
    match limit {
        Some(n) => format!("SELECT * FROM {schema}.{table} LIMIT {n}"),
        None => format!("SELECT * FROM {schema}.{table}"),
    }
}
