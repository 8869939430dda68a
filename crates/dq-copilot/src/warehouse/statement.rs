//! Decoding of SQL statement execution responses.
//!
//! Results come back in `JSON_ARRAY` format: a column manifest plus rows of
//! nullable strings. Column types from the manifest decide the polars dtype;
//! cells that do not parse as their declared type become null.

use crate::error::{CopilotError, Result};
use crate::types::{SourceKind, Table};
use polars::prelude::*;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct StatementResponse {
    status: StatementStatus,
    manifest: Option<Manifest>,
    result: Option<ResultChunk>,
}

#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: String,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    schema: ManifestSchema,
}

#[derive(Debug, Deserialize)]
struct ManifestSchema {
    #[serde(default)]
    columns: Vec<ResultColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultChunk {
    #[serde(default)]
    data_array: Vec<Vec<Option<String>>>,
    next_chunk_internal_link: Option<String>,
}

/// One column of a statement result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    pub type_name: String,
}

/// A successful statement result, possibly still missing later chunks.
#[derive(Debug, Clone, Default)]
pub struct StatementResult {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Vec<Option<String>>>,
    /// Relative link to the next result chunk, if any.
    pub next_chunk: Option<String>,
}

/// Decode a statement response body.
///
/// Any state other than `SUCCEEDED` is a [`CopilotError::Connection`]
/// carrying the service's error message.
pub fn decode_statement(raw: &str) -> Result<StatementResult> {
    let response: StatementResponse = serde_json::from_str(raw)
        .map_err(|e| CopilotError::Connection(format!("malformed statement response: {e}")))?;

    if response.status.state != "SUCCEEDED" {
        let detail = response
            .status
            .error
            .map(|e| {
                format!(
                    "{}: {}",
                    e.error_code.as_deref().unwrap_or("UNKNOWN"),
                    e.message.as_deref().unwrap_or("no message")
                )
            })
            .unwrap_or_else(|| "no error detail".to_string());
        return Err(CopilotError::Connection(format!(
            "statement {}: {}",
            response.status.state, detail
        )));
    }

    let columns = response
        .manifest
        .map(|m| m.schema.columns)
        .unwrap_or_default();
    let chunk = response.result.unwrap_or_default();

    Ok(StatementResult {
        columns,
        rows: chunk.data_array,
        next_chunk: chunk.next_chunk_internal_link,
    })
}

impl StatementResult {
    /// Append the rows of a follow-up chunk body and advance `next_chunk`.
    pub fn extend_from_chunk(&mut self, raw: &str) -> Result<()> {
        let chunk: ResultChunk = serde_json::from_str(raw)
            .map_err(|e| CopilotError::Connection(format!("malformed result chunk: {e}")))?;
        self.rows.extend(chunk.data_array);
        self.next_chunk = chunk.next_chunk_internal_link;
        Ok(())
    }

    /// Non-null values of the column at `index`, in row order.
    pub fn column_values(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).cloned().flatten())
            .collect()
    }

    /// Build a warehouse [`Table`] named `name` from the rows.
    pub fn into_table(self, name: &str) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.columns.len());

        for (index, column) in self.columns.iter().enumerate() {
            let cells: Vec<Option<&str>> = self
                .rows
                .iter()
                .map(|row| row.get(index).and_then(|cell| cell.as_deref()))
                .collect();
            columns.push(typed_column(column, &cells));
        }

        debug!(
            "Decoded {} rows x {} columns for '{}'",
            self.rows.len(),
            columns.len(),
            name
        );
        let df = DataFrame::new(columns)?;
        Ok(Table::new(name, SourceKind::Warehouse, df))
    }
}

fn typed_column(column: &ResultColumn, cells: &[Option<&str>]) -> Column {
    let name = PlSmallStr::from(column.name.as_str());

    match column.type_name.to_ascii_uppercase().as_str() {
        "BYTE" | "SHORT" | "INT" | "LONG" | "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| cell.and_then(|v| v.trim().parse().ok()))
                .collect();
            Column::new(name, values)
        }
        "FLOAT" | "DOUBLE" | "DECIMAL" => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| cell.and_then(|v| v.trim().parse().ok()))
                .collect();
            Column::new(name, values)
        }
        "BOOLEAN" => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| cell.and_then(|v| v.trim().parse().ok()))
                .collect();
            Column::new(name, values)
        }
        _ => Column::new(name, cells.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SUCCEEDED: &str = r#"{
        "statement_id": "01ef",
        "status": {"state": "SUCCEEDED"},
        "manifest": {"schema": {"column_count": 4, "columns": [
            {"name": "id", "type_name": "LONG", "position": 0},
            {"name": "email", "type_name": "STRING", "position": 1},
            {"name": "amount", "type_name": "DECIMAL", "position": 2},
            {"name": "active", "type_name": "BOOLEAN", "position": 3}
        ]}},
        "result": {"data_array": [
            ["1", "a@x.com", "10.50", "true"],
            ["2", null, "-3", "false"],
            ["x", "c@x.com", null, null]
        ], "next_chunk_internal_link": "/api/2.0/sql/statements/01ef/result/chunks/1"}
    }"#;

    #[test]
    fn test_decode_typed_columns() {
        let result = decode_statement(SUCCEEDED).unwrap();
        assert_eq!(
            result.next_chunk.as_deref(),
            Some("/api/2.0/sql/statements/01ef/result/chunks/1")
        );

        let table = result.into_table("sales.customers").unwrap();
        let df = table.data();
        assert_eq!(table.source(), SourceKind::Warehouse);
        assert_eq!(df.shape(), (3, 4));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("id").unwrap().null_count(), 1);
        assert_eq!(df.column("email").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("amount").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("active").unwrap().dtype(), &DataType::Boolean);
    }

    #[test]
    fn test_follow_up_chunk() {
        let mut result = decode_statement(SUCCEEDED).unwrap();
        result
            .extend_from_chunk(r#"{"chunk_index": 1, "data_array": [["4", "d@x.com", "1", "true"]]}"#)
            .unwrap();

        assert_eq!(result.rows.len(), 4);
        assert_eq!(result.next_chunk, None);
    }

    #[test]
    fn test_show_tables_second_column() {
        let raw = r#"{
            "status": {"state": "SUCCEEDED"},
            "manifest": {"schema": {"columns": [
                {"name": "database", "type_name": "STRING"},
                {"name": "tableName", "type_name": "STRING"},
                {"name": "isTemporary", "type_name": "BOOLEAN"}
            ]}},
            "result": {"data_array": [["sales", "orders", "false"], ["sales", "customers", "false"]]}
        }"#;

        let result = decode_statement(raw).unwrap();
        assert_eq!(result.column_values(1), vec!["orders", "customers"]);
    }

    #[test]
    fn test_failed_statement_is_connection_error() {
        let raw = r#"{"status": {"state": "FAILED", "error": {"error_code": "PERMISSION_DENIED", "message": "no access"}}}"#;

        let err = decode_statement(raw).unwrap_err();
        assert_eq!(err.error_code(), "CONNECTION_ERROR");
        assert!(err.to_string().contains("PERMISSION_DENIED: no access"));
    }

    #[test]
    fn test_malformed_body_is_connection_error() {
        let err = decode_statement("<html>502</html>").unwrap_err();
        assert!(matches!(err, CopilotError::Connection(_)));
    }

    #[test]
    fn test_empty_result() {
        let raw = r#"{"status": {"state": "SUCCEEDED"}, "manifest": {"schema": {"columns": [{"name": "id", "type_name": "INT"}]}}}"#;
        let table = decode_statement(raw).unwrap().into_table("t").unwrap();
        assert_eq!(table.height(), 0);
    }
}
