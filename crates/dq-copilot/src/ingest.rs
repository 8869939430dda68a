//! CSV loading into [`Table`]s.
//!
//! Uploaded files are often slightly malformed, so parsing falls back
//! through progressively more lenient strategies before giving up.

use crate::error::{CopilotError, Result, ResultExt};
use crate::types::{SourceKind, Table};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Rows inspected when inferring column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file. The table is named after the file name.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = std::fs::read(path)
        .map_err(CopilotError::from)
        .context(format!("Reading {}", path.display()))?;

    load_csv_bytes(name, &bytes)
}

/// Load CSV content already in memory, e.g. an uploaded file.
pub fn load_csv_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Table> {
    let name = name.into();
    let df = parse_with_fallbacks(bytes).context(format!("Parsing CSV '{name}'"))?;
    info!("Loaded '{}': {} rows x {} columns", name, df.height(), df.width());
    Ok(Table::new(name, SourceKind::File, df))
}

fn parse_with_fallbacks(bytes: &[u8]) -> Result<DataFrame> {
    // Strategy 1: standard parsing with quote handling
    match parse(bytes.to_vec(), Some(b'"')) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard parsing failed: {}", e),
    }

    // Strategy 2: quotes taken literally
    match parse(bytes.to_vec(), None) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Parsing without quotes failed: {}", e),
    }

    // Strategy 3: pre-cleaned content
    let cleaned = clean_csv_content(&String::from_utf8_lossy(bytes));
    Ok(parse(cleaned.into_bytes(), Some(b'"'))?)
}

fn parse(bytes: Vec<u8>, quote_char: Option<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(quote_char))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_csv_names_table_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,email\n1,a@x.com\n2,").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.name(), "customers.csv");
        assert_eq!(table.source(), SourceKind::File);
        assert_eq!(table.height(), 2);
        assert_eq!(table.data().column("email").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_csv_bytes_with_quotes() {
        let table = load_csv_bytes("q.csv", b"name,city\n\"Doe, Jane\",Oslo\n").unwrap();
        assert_eq!(table.data().shape(), (1, 2));
    }

    #[test]
    fn test_header_only_file_has_zero_rows() {
        let table = load_csv_bytes("empty.csv", b"a,b\n").unwrap();
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("/no/such/file.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_clean_csv_content() {
        assert_eq!(clean_csv_content("a,b\n\n\"\"x\"\",1\n  \n"), "a,b\n\"x\",1");
    }
}
