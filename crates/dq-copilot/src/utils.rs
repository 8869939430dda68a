//! Shared utilities for the data quality copilot.
//!
//! This module contains helpers used by the metrics engine, the prompt
//! builders and the CLI preview.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for metric selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// String/text type
    Text,
    /// Anything else (dates, booleans, nested types)
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_text_dtype(dtype) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Utilities
// =============================================================================

/// Title-case test with the usual `str.istitle` semantics.
///
/// Uppercase letters may only follow uncased characters, lowercase letters
/// may only follow cased characters, and at least one cased character must
/// be present. "Hello World" and "O'Neil" pass, "hello", "HELLO" and "123"
/// do not.
pub fn is_title_case(value: &str) -> bool {
    let mut seen_cased = false;
    let mut previous_cased = false;

    for ch in value.chars() {
        if ch.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else if ch.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else {
            previous_cased = false;
        }
    }

    seen_cased
}

/// Truncate a string for fixed-width display.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

// =============================================================================
// Table Rendering
// =============================================================================

/// Rendering of a missing cell in markdown previews.
const MISSING_CELL: &str = "nan";

/// Render one cell for a markdown table.
fn format_cell(value: &AnyValue) -> String {
    let raw = match value {
        AnyValue::Null => MISSING_CELL.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => format!("{other}"),
    };
    raw.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render a DataFrame as a markdown pipe table with a leading row index.
///
/// All rows are rendered in their original order; numeric columns are
/// right-aligned. Rendering at most `max_rows` rows gives a head preview.
pub fn render_markdown_table(df: &DataFrame, max_rows: Option<usize>) -> PolarsResult<String> {
    let columns = df.get_columns();
    let rows = max_rows.map_or(df.height(), |limit| limit.min(df.height()));

    let mut out = String::from("|    |");
    for column in columns {
        out.push_str(&format!(" {} |", column.name()));
    }
    out.push_str("\n|---:|");
    for column in columns {
        if is_numeric_dtype(column.dtype()) {
            out.push_str("---:|");
        } else {
            out.push_str(":---|");
        }
    }
    out.push('\n');

    for row in 0..rows {
        out.push_str(&format!("| {row} |"));
        for column in columns {
            let value = column.as_materialized_series().get(row)?;
            out.push_str(&format!(" {} |", format_cell(&value)));
        }
        out.push('\n');
    }

    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
