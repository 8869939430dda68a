//! Issue extraction from narrative text.
//!
//! Narratives are LLM prose that only loosely follows the requested report
//! template, so extraction is tolerant by construction: unknown lines are
//! ignored, missing fields stay empty, and sub-blocks without an issue title
//! are dropped instead of failing the parse.
//!
//! The parse runs in three stages, each usable on its own:
//!
//! 1. [`split_into_sections`] cuts the blob at `Analysis for file: ` /
//!    `Analysis for table: ` header lines and resolves the owning table.
//! 2. [`split_into_subblocks`] cuts a section body at `---` lines.
//! 3. [`extract_fields`] scans one sub-block for single-line field markers,
//!    in plain (`- Details:`) or emphasized (`- **Details:**`) form.
//!
//! [`parse_issues`] composes the stages and keeps section order, then
//! sub-block order within a section.

mod fields;
mod sections;

pub use fields::{IssueField, IssueFields, extract_fields, match_field_marker};
pub use sections::{
    Section, SubBlock, is_issue_separator, section_header, split_into_sections,
    split_into_subblocks, split_preamble,
};

use crate::error::{CopilotError, Result, ResultExt};
use crate::types::IssueRecord;
use std::path::Path;
use tracing::debug;

/// Parse every issue in `blob`, in narrative order.
///
/// This is a pure function of the text: parsing the same blob twice yields
/// the same records.
pub fn parse_issues(blob: &str) -> Vec<IssueRecord> {
    let mut issues = Vec::new();

    for section in split_into_sections(blob) {
        for (index, block) in split_into_subblocks(&section.lines).iter().enumerate() {
            if block.is_blank() {
                continue;
            }
            match extract_fields(&block.lines).into_record(section.owning_table) {
                Some(record) => issues.push(record),
                None => debug!(
                    "Dropping sub-block {} of '{}': no issue title",
                    index, section.owning_table
                ),
            }
        }
    }

    issues
}

/// Read a persisted narrative file and parse its issues.
pub fn parse_issues_file(path: impl AsRef<Path>) -> Result<Vec<IssueRecord>> {
    let path = path.as_ref();
    let blob = std::fs::read_to_string(path)
        .map_err(CopilotError::from)
        .context(format!("Reading narrative file {}", path.display()))?;
    Ok(parse_issues(&blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_TABLE;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_sections_mixed_marker_styles() {
        let blob = "Analysis for file: a.csv\n- **Issue:** Dup rows\n- Details: 3 duplicate keys\n---\nAnalysis for file: b.csv\n- Issue: Null ids\n---";

        let issues = parse_issues(blob);

        let mut first = IssueRecord::new("a.csv", "Dup rows");
        first.details = Some("3 duplicate keys".to_string());
        let second = IssueRecord::new("b.csv", "Null ids");
        assert_eq!(issues, vec![first, second]);
    }

    #[test]
    fn test_empty_blob() {
        assert!(parse_issues("").is_empty());
        assert!(parse_issues("\n\n   \n").is_empty());
    }

    #[test]
    fn test_headers_without_bodies() {
        let blob = "Analysis for file: a.csv\nAnalysis for table: sales.orders\n";
        assert!(parse_issues(blob).is_empty());
    }

    #[test]
    fn test_titleless_subblock_is_dropped() {
        let blob = "Analysis for table: t\n- Issue: Real one\n---\n- Details: orphan details\n- Location: row 4\n---\n";

        let issues = parse_issues(blob);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "Real one");
        assert_eq!(issues[0].owning_table, "t");
    }

    #[test]
    fn test_preamble_belongs_to_unknown_table() {
        let blob = "Cross-file findings\n- Issue: Orphan order ids\n---\nAnalysis for file: orders.csv\n- Issue: Negative qty\n";

        let issues = parse_issues(blob);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].owning_table, UNKNOWN_TABLE);
        assert_eq!(issues[1].owning_table, "orders.csv");
    }

    #[test]
    fn test_duplicate_marker_last_wins() {
        let blob = "- Issue: first\n- Details: a\n- **Details:** b\n- Issue: second";

        let issues = parse_issues(blob);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "second");
        assert_eq!(issues[0].details.as_deref(), Some("b"));
    }

    #[test]
    fn test_continuation_lines_are_not_appended() {
        let blob = "Analysis for file: a.csv\n- Issue: Bad dates\n- Details: Some dates are in the future\n  and some are before 1900.\nMore prose here.\n";

        let issues = parse_issues(blob);
        assert_eq!(
            issues[0].details.as_deref(),
            Some("Some dates are in the future")
        );
    }

    #[test]
    fn test_persisted_layout_with_rules() {
        let blob = "\
Overall the datasets share customer_id.
- Issue: Orphan orders
================================================================================
Analysis for file: customers.csv
- **Issue:** Invalid emails
- **Location:** column email, rows 2 and 5
---
- **Issue:** Mixed case names
================================================================================
";

        let issues = parse_issues(blob);
        let titles: Vec<_> = issues.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Orphan orders", "Invalid emails", "Mixed case names"]);
        assert_eq!(issues[1].location.as_deref(), Some("column email, rows 2 and 5"));
        assert_eq!(issues[2].owning_table, "customers.csv");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let blob = "Analysis for file: a.csv\n- Issue: x\n---\n- Issue: y\n";
        assert_eq!(parse_issues(blob), parse_issues(blob));
    }

    #[test]
    fn test_parse_issues_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrative.txt");
        std::fs::write(&path, "Analysis for table: t\n- Issue: Stale rows\n").unwrap();

        let issues = parse_issues_file(&path).unwrap();
        assert_eq!(issues, vec![IssueRecord::new("t", "Stale rows")]);
    }

    #[test]
    fn test_parse_issues_missing_file() {
        let err = parse_issues_file("/definitely/not/here.txt").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
