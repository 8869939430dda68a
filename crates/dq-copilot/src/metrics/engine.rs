use crate::error::{CopilotError, Result, ResultExt};
use crate::types::{MetricEntry, Table};
use crate::utils::{DtypeCategory, get_dtype_category, is_title_case};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

// Permissive local@domain.tld; matched anywhere in the cell.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^@]+@[^@]+\.[^@]+").expect("Invalid regex: email"));

// Optional leading '+' then 10-15 digits, whole cell.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("Invalid regex: phone"));

/// Column-level quality metrics over a loaded table.
pub struct MetricsEngine;

impl MetricsEngine {
    /// Compute one [`MetricEntry`] per column, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`CopilotError::EmptyTable`] when the table has no rows.
    pub fn compute_metrics(table: &Table) -> Result<Vec<MetricEntry>> {
        Self::compute_metrics_at(table, Utc::now())
    }

    /// Same as [`MetricsEngine::compute_metrics`] with a fixed snapshot time.
    pub fn compute_metrics_at(
        table: &Table,
        snapshot_time: DateTime<Utc>,
    ) -> Result<Vec<MetricEntry>> {
        let total_rows = table.height();
        if total_rows == 0 {
            return Err(CopilotError::EmptyTable {
                table: table.name().to_string(),
            });
        }

        let mut metrics = Vec::with_capacity(table.data().width());
        for column in table.data().get_columns() {
            let series = column.as_materialized_series();
            let entry = Self::column_metrics(table.name(), series, total_rows, snapshot_time)
                .context(format!("Computing metrics for column '{}'", series.name()))?;
            metrics.push(entry);
        }

        debug!(
            "Computed metrics for {} columns of '{}'",
            metrics.len(),
            table.name()
        );
        Ok(metrics)
    }

    fn column_metrics(
        table_name: &str,
        series: &Series,
        total_rows: usize,
        snapshot_time: DateTime<Utc>,
    ) -> Result<MetricEntry> {
        let non_missing = total_rows - series.null_count();
        let distinct = series.drop_nulls().n_unique()?;

        let mut entry = MetricEntry::new(
            table_name,
            series.name().as_str(),
            snapshot_time,
            percentage(non_missing, total_rows),
            percentage(distinct, total_rows),
        );

        match get_dtype_category(series.dtype()) {
            DtypeCategory::Text => Self::add_text_metrics(&mut entry, series, total_rows)?,
            DtypeCategory::Numeric => Self::add_numeric_metrics(&mut entry, series, total_rows)?,
            DtypeCategory::Other => {}
        }

        Ok(entry)
    }

    fn add_text_metrics(entry: &mut MetricEntry, series: &Series, total_rows: usize) -> Result<()> {
        let values = series.str()?;
        let present: Vec<&str> = values.into_iter().flatten().collect();

        let empty = present.iter().filter(|v| v.is_empty()).count();
        let untrimmed = present.iter().filter(|v| v.trim() != **v).count();
        let titled = present.iter().filter(|v| is_title_case(v)).count();

        entry.empty_string_pct = Some(percentage(empty, total_rows));
        entry.whitespace_issues_pct = Some(percentage(untrimmed, present.len()));
        entry.capitalized_pct = Some(percentage(titled, present.len()));

        let column_name = entry.column.to_lowercase();
        if column_name.contains("email") {
            let valid = present.iter().filter(|v| EMAIL_PATTERN.is_match(v)).count();
            entry.regex_email_valid_pct = Some(percentage(valid, total_rows));
        }
        if column_name.contains("phone") {
            let valid = present.iter().filter(|v| PHONE_PATTERN.is_match(v)).count();
            entry.regex_phone_valid_pct = Some(percentage(valid, total_rows));
        }

        Ok(())
    }

    fn add_numeric_metrics(
        entry: &mut MetricEntry,
        series: &Series,
        total_rows: usize,
    ) -> Result<()> {
        let floats = series.cast(&DataType::Float64)?;
        let values = floats.f64()?;

        let zeros = values.into_iter().filter(|v| *v == Some(0.0)).count();
        let negatives = values
            .into_iter()
            .filter(|v| v.is_some_and(|val| val < 0.0))
            .count();

        entry.zero_values_pct = Some(percentage(zeros, total_rows));
        entry.negative_values_pct = Some(percentage(negatives, total_rows));

        Ok(())
    }
}

/// `count / total * 100`, with an empty denominator yielding 0.0.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn table(df: DataFrame) -> Table {
        Table::new("customers.csv", SourceKind::File, df)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==================== core metrics ====================

    #[test]
    fn test_empty_table_is_an_error() {
        let df = DataFrame::new(vec![
            Series::new_empty("id".into(), &DataType::Int64).into(),
        ])
        .unwrap();

        let err = MetricsEngine::compute_metrics(&table(df)).unwrap_err();
        assert!(matches!(err, CopilotError::EmptyTable { ref table } if table == "customers.csv"));
    }

    #[test]
    fn test_completeness_and_uniqueness() {
        let df = df!["city" => [Some("Oslo"), Some("Oslo"), None, Some("Rome")]].unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].table, "customers.csv");
        assert_eq!(metrics[0].column, "city");
        assert!(approx(metrics[0].completeness_pct, 75.0));
        // Missing values are not counted as a distinct value
        assert!(approx(metrics[0].uniqueness_pct, 50.0));
    }

    #[test]
    fn test_columns_keep_order_and_share_snapshot() {
        let df = df![
            "b" => [1i64, 2],
            "a" => ["x", "y"],
        ]
        .unwrap();
        let at = Utc::now();

        let metrics = MetricsEngine::compute_metrics_at(&table(df), at).unwrap();
        let names: Vec<_> = metrics.iter().map(|m| m.column.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(metrics.iter().all(|m| m.snapshot_time == at));
    }

    // ==================== numeric metrics ====================

    #[test]
    fn test_zero_and_negative_values() {
        let df = df!["balance" => [0i64, -1, 2, 0]].unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        assert_eq!(metrics[0].zero_values_pct, Some(50.0));
        assert_eq!(metrics[0].negative_values_pct, Some(25.0));
        assert!(metrics[0].empty_string_pct.is_none());
        assert!(metrics[0].capitalized_pct.is_none());
    }

    #[test]
    fn test_numeric_metrics_count_against_total_rows() {
        let df = df!["amount" => [Some(0.0f64), None, Some(-3.5), None]].unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        assert_eq!(metrics[0].zero_values_pct, Some(25.0));
        assert_eq!(metrics[0].negative_values_pct, Some(25.0));
        assert!(approx(metrics[0].completeness_pct, 50.0));
    }

    // ==================== text metrics ====================

    #[test]
    fn test_text_metrics() {
        let df = df!["name" => [Some("Alice Smith"), Some(" bob "), Some(""), None]].unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        let m = &metrics[0];
        assert_eq!(m.empty_string_pct, Some(25.0));
        // 1 of 3 present cells has surrounding whitespace
        assert!(approx(m.whitespace_issues_pct.unwrap(), 100.0 / 3.0));
        assert!(approx(m.capitalized_pct.unwrap(), 100.0 / 3.0));
        assert!(m.regex_email_valid_pct.is_none());
        assert!(m.zero_values_pct.is_none());
    }

    #[test]
    fn test_all_missing_text_column() {
        let df = df!["note" => [None::<&str>, None]].unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        assert_eq!(metrics[0].completeness_pct, 0.0);
        assert_eq!(metrics[0].whitespace_issues_pct, Some(0.0));
        assert_eq!(metrics[0].capitalized_pct, Some(0.0));
    }

    #[test]
    fn test_email_validity_is_case_insensitive_on_name() {
        let df = df![
            "Contact_EMAIL" => [Some("a@b.com"), Some("not-an-email"), Some("x@y"), None]
        ]
        .unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        assert_eq!(metrics[0].regex_email_valid_pct, Some(25.0));
        assert!(metrics[0].regex_phone_valid_pct.is_none());
    }

    #[test]
    fn test_phone_validity_requires_full_match() {
        let df = df![
            "phone" => [Some("+4712345678"), Some("1234567890123"), Some("tel 1234567890"), Some("12345")]
        ]
        .unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        assert_eq!(metrics[0].regex_phone_valid_pct, Some(50.0));
    }

    #[test]
    fn test_boolean_column_has_only_core_metrics() {
        let df = df!["active" => [true, false, true]].unwrap();

        let metrics = MetricsEngine::compute_metrics(&table(df)).unwrap();
        let m = &metrics[0];
        assert!(approx(m.uniqueness_pct, 200.0 / 3.0));
        assert!(m.zero_values_pct.is_none());
        assert!(m.empty_string_pct.is_none());
    }

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
