use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owning-table label for narrative text that precedes any section header.
pub const UNKNOWN_TABLE: &str = "Unknown";

/// Display sentinel for issue fields the narrative did not provide.
pub const NOT_AVAILABLE: &str = "Not available";

// ============================================================================
// Tables
// ============================================================================

/// Where a table came from. Decides the narrative section header wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Uploaded flat file (header `Analysis for file: <name>`)
    File,
    /// Warehouse table (header `Analysis for table: <name>`)
    Warehouse,
}

impl SourceKind {
    /// Header prefix written before a per-table narrative section.
    pub fn section_prefix(self) -> &'static str {
        match self {
            Self::File => "Analysis for file: ",
            Self::Warehouse => "Analysis for table: ",
        }
    }
}

/// A named, read-only table loaded for one session.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    source: SourceKind,
    data: DataFrame,
}

impl Table {
    pub fn new(name: impl Into<String>, source: SourceKind, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            source,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// The `Analysis for ...: <name>` header line for this table.
    pub fn section_header(&self) -> String {
        format!("{}{}", self.source.section_prefix(), self.name)
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Per-(table, column) quality statistics.
///
/// Text-only and numeric-only metrics are `None` when they do not apply,
/// and are left out of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub table: String,
    pub column: String,
    pub snapshot_time: DateTime<Utc>,
    pub completeness_pct: f64,
    pub uniqueness_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_string_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitespace_issues_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capitalized_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_email_valid_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_phone_valid_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_values_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_values_pct: Option<f64>,
}

impl MetricEntry {
    /// Entry with only the always-present metrics filled in.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        snapshot_time: DateTime<Utc>,
        completeness_pct: f64,
        uniqueness_pct: f64,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            snapshot_time,
            completeness_pct,
            uniqueness_pct,
            empty_string_pct: None,
            whitespace_issues_pct: None,
            capitalized_pct: None,
            regex_email_valid_pct: None,
            regex_phone_valid_pct: None,
            zero_values_pct: None,
            negative_values_pct: None,
        }
    }
}

// ============================================================================
// Issues
// ============================================================================

/// One data-quality issue recovered from a narrative.
///
/// `title` is mandatory; the other fields are whatever the narrative
/// provided. Use [`IssueRecord::display_fields`] for a view where missing
/// fields show [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub owning_table: String,
    pub title: String,
    pub details: Option<String>,
    pub expected_state: Option<String>,
    pub violated_constraint: Option<String>,
    pub location: Option<String>,
    pub guideline_violated: Option<String>,
}

impl IssueRecord {
    pub fn new(owning_table: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owning_table: owning_table.into(),
            title: title.into(),
            details: None,
            expected_state: None,
            violated_constraint: None,
            location: None,
            guideline_violated: None,
        }
    }

    /// Labelled fields in display order, with the sentinel for gaps.
    pub fn display_fields(&self) -> [(&'static str, &str); 7] {
        fn or_na(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or(NOT_AVAILABLE)
        }

        [
            ("Table", self.owning_table.as_str()),
            ("Issue", self.title.as_str()),
            ("Details", or_na(&self.details)),
            ("Expected correct state", or_na(&self.expected_state)),
            ("Violated constraint", or_na(&self.violated_constraint)),
            ("Location", or_na(&self.location)),
            ("Guideline violated", or_na(&self.guideline_violated)),
        ]
    }
}

impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.display_fields() {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Narrative and remediation
// ============================================================================

/// How a narrative request covers its tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeMode {
    /// One global analysis of the relationships between all tables
    CrossTable,
    /// One section per table, each under its own header line
    PerTable,
}

/// Operator-chosen remediation mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemediationStrategy {
    /// Ask the text-generation backend for a recommended fix
    AutoFix,
    /// Produce an annotation from the issue details
    Annotate,
    /// Use the operator's own fix text verbatim (may be empty)
    Custom(String),
}

impl RemediationStrategy {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AutoFix => "auto-fix",
            Self::Annotate => "annotate",
            Self::Custom(_) => "custom",
        }
    }
}
