//! Field-marker recognition inside one sub-block.

use crate::types::IssueRecord;

/// Field markers recognized in a narrative sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueField {
    Title,
    Details,
    ExpectedState,
    ViolatedConstraint,
    Location,
    GuidelineViolated,
}

impl IssueField {
    pub const ALL: [IssueField; 6] = [
        Self::Title,
        Self::Details,
        Self::ExpectedState,
        Self::ViolatedConstraint,
        Self::Location,
        Self::GuidelineViolated,
    ];

    /// Marker name as written in a narrative, without list dash or colon.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Title => "Issue",
            Self::Details => "Details",
            Self::ExpectedState => "Expected correct state",
            Self::ViolatedConstraint => "Violated constraint",
            Self::Location => "Location",
            Self::GuidelineViolated => "Guideline Violated",
        }
    }

    /// Value following this field's marker on `line`, if the line carries it.
    ///
    /// Accepts `- Name: value` and `- **Name:** value`.
    fn strip_marker(self, line: &str) -> Option<&str> {
        let rest = line.strip_prefix("- ")?;
        let marker = self.marker();

        if let Some(emphasized) = rest.strip_prefix("**") {
            return emphasized.strip_prefix(marker)?.strip_prefix(":**");
        }
        rest.strip_prefix(marker)?.strip_prefix(':')
    }
}

/// Recognize a field marker at the start of `line`.
///
/// Leading indentation is ignored and the value is trimmed. Marker names
/// are case-sensitive. A marker with nothing after it yields `None`.
pub fn match_field_marker(line: &str) -> Option<(IssueField, &str)> {
    let line = line.trim_start();
    IssueField::ALL.iter().find_map(|&field| {
        let value = field.strip_marker(line)?.trim();
        (!value.is_empty()).then_some((field, value))
    })
}

/// Field values collected from one sub-block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFields {
    pub title: Option<String>,
    pub details: Option<String>,
    pub expected_state: Option<String>,
    pub violated_constraint: Option<String>,
    pub location: Option<String>,
    pub guideline_violated: Option<String>,
}

impl IssueFields {
    /// Assign `value` to `field`, replacing any earlier value.
    pub fn set(&mut self, field: IssueField, value: impl Into<String>) {
        let slot = match field {
            IssueField::Title => &mut self.title,
            IssueField::Details => &mut self.details,
            IssueField::ExpectedState => &mut self.expected_state,
            IssueField::ViolatedConstraint => &mut self.violated_constraint,
            IssueField::Location => &mut self.location,
            IssueField::GuidelineViolated => &mut self.guideline_violated,
        };
        *slot = Some(value.into());
    }

    /// Build a record owned by `owning_table`; `None` without a title.
    pub fn into_record(self, owning_table: &str) -> Option<IssueRecord> {
        let title = self.title?;
        Some(IssueRecord {
            owning_table: owning_table.to_string(),
            title,
            details: self.details,
            expected_state: self.expected_state,
            violated_constraint: self.violated_constraint,
            location: self.location,
            guideline_violated: self.guideline_violated,
        })
    }
}

/// Scan `lines` for field markers. Later markers overwrite earlier ones.
pub fn extract_fields(lines: &[&str]) -> IssueFields {
    let mut fields = IssueFields::default();
    for (field, value) in lines.iter().filter_map(|line| match_field_marker(line)) {
        fields.set(field, value);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_and_emphasized_markers() {
        assert_eq!(
            match_field_marker("- Issue: Dup rows"),
            Some((IssueField::Title, "Dup rows"))
        );
        assert_eq!(
            match_field_marker("- **Issue:** Dup rows"),
            Some((IssueField::Title, "Dup rows"))
        );
        assert_eq!(
            match_field_marker("   - **Expected correct state:**  unique ids  "),
            Some((IssueField::ExpectedState, "unique ids"))
        );
        assert_eq!(
            match_field_marker("- Guideline Violated: GDPR Art. 5"),
            Some((IssueField::GuidelineViolated, "GDPR Art. 5"))
        );
    }

    #[test]
    fn test_non_markers() {
        assert_eq!(match_field_marker("Issue: no dash"), None);
        assert_eq!(match_field_marker("- issue: lowercase"), None);
        assert_eq!(match_field_marker("- Issues: plural"), None);
        assert_eq!(match_field_marker("- **Issue**: colon outside"), None);
        assert_eq!(match_field_marker("- Details:"), None);
        assert_eq!(match_field_marker("- **Details:**   "), None);
        assert_eq!(match_field_marker(""), None);
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        assert_eq!(
            match_field_marker("- Location: column ts: rows 3-7"),
            Some((IssueField::Location, "column ts: rows 3-7"))
        );
    }

    #[test]
    fn test_extract_fields_last_wins() {
        let fields = extract_fields(&[
            "- Issue: first",
            "- Violated constraint: NOT NULL",
            "some prose",
            "- **Violated constraint:** UNIQUE",
        ]);

        assert_eq!(fields.title.as_deref(), Some("first"));
        assert_eq!(fields.violated_constraint.as_deref(), Some("UNIQUE"));
        assert_eq!(fields.details, None);
    }

    #[test]
    fn test_empty_marker_does_not_clear_earlier_value() {
        let fields = extract_fields(&["- Issue: kept", "- Issue:"]);
        assert_eq!(fields.title.as_deref(), Some("kept"));
    }

    #[test]
    fn test_into_record_requires_title() {
        let fields = extract_fields(&["- Details: orphan"]);
        assert_eq!(fields.into_record("t"), None);

        let record = extract_fields(&["- Issue: x", "- Location: row 1"])
            .into_record("t")
            .unwrap();
        assert_eq!(record.owning_table, "t");
        assert_eq!(record.location.as_deref(), Some("row 1"));
    }
}
