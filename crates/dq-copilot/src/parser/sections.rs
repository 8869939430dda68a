//! Section and sub-block splitting.

use crate::narrative::ISSUE_SEPARATOR;
use crate::types::UNKNOWN_TABLE;

/// Header prefixes that open a per-table section.
const SECTION_PREFIXES: [&str; 2] = ["Analysis for file: ", "Analysis for table: "];

/// A contiguous run of narrative lines owned by one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Header remainder, or [`UNKNOWN_TABLE`] for text before any header.
    pub owning_table: &'a str,
    /// Body lines, header excluded.
    pub lines: Vec<&'a str>,
}

/// One `---`-delimited unit of a section body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubBlock<'a> {
    pub lines: Vec<&'a str>,
}

impl SubBlock<'_> {
    /// True when every line is whitespace (or there are no lines).
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

/// Owning-table name if `line` is a section header.
///
/// The prefix must start the line. A header with nothing after the prefix
/// resolves to [`UNKNOWN_TABLE`].
pub fn section_header(line: &str) -> Option<&str> {
    SECTION_PREFIXES.iter().find_map(|prefix| {
        line.strip_prefix(prefix).map(|rest| match rest.trim() {
            "" => UNKNOWN_TABLE,
            name => name,
        })
    })
}

/// True for a line consisting solely of the issue separator.
pub fn is_issue_separator(line: &str) -> bool {
    line.trim() == ISSUE_SEPARATOR
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    /// Before the first header; lines form the preamble.
    ScanningForHeader,
    /// After a header; lines belong to the current section.
    InSection,
}

/// Split `blob` at every header line, keeping each header with the section
/// it opens.
///
/// Text before the first header becomes a leading section owned by
/// [`UNKNOWN_TABLE`]; it is omitted when it has no lines at all.
pub fn split_into_sections(blob: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut state = SplitState::ScanningForHeader;
    let mut current = Section {
        owning_table: UNKNOWN_TABLE,
        lines: Vec::new(),
    };

    for line in blob.lines() {
        match section_header(line) {
            Some(owner) => {
                if state == SplitState::InSection || !current.lines.is_empty() {
                    sections.push(current);
                }
                current = Section {
                    owning_table: owner,
                    lines: Vec::new(),
                };
                state = SplitState::InSection;
            }
            None => current.lines.push(line),
        }
    }

    if state == SplitState::InSection || !current.lines.is_empty() {
        sections.push(current);
    }

    sections
}

/// Split `blob` before its first header line.
///
/// Returns the headerless leading text and the remainder starting at the
/// first header. Without any header the whole blob is leading text.
pub fn split_preamble(blob: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in blob.split_inclusive('\n') {
        let content = line
            .strip_suffix('\n')
            .map_or(line, |l| l.strip_suffix('\r').unwrap_or(l));
        if section_header(content).is_some() {
            return blob.split_at(offset);
        }
        offset += line.len();
    }
    (blob, "")
}

/// Split section body lines at separator lines.
///
/// Separator lines themselves are dropped. Blank sub-blocks are kept so
/// callers see the block positions; use [`SubBlock::is_blank`] to skip them.
pub fn split_into_subblocks<'a>(lines: &[&'a str]) -> Vec<SubBlock<'a>> {
    let mut blocks = vec![SubBlock::default()];

    for &line in lines {
        if is_issue_separator(line) {
            blocks.push(SubBlock::default());
        } else if let Some(block) = blocks.last_mut() {
            block.lines.push(line);
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_header() {
        assert_eq!(section_header("Analysis for file: a.csv"), Some("a.csv"));
        assert_eq!(
            section_header("Analysis for table: sales.orders  "),
            Some("sales.orders")
        );
        assert_eq!(section_header("Analysis for file: "), Some(UNKNOWN_TABLE));
        assert_eq!(section_header("  Analysis for file: a.csv"), None);
        assert_eq!(section_header("analysis for file: a.csv"), None);
        assert_eq!(section_header("See Analysis for file: a.csv"), None);
    }

    #[test]
    fn test_is_issue_separator() {
        assert!(is_issue_separator("---"));
        assert!(is_issue_separator("--- "));
        assert!(!is_issue_separator("----"));
        assert!(!is_issue_separator("--- end"));
        assert!(!is_issue_separator("- Issue: ---"));
    }

    #[test]
    fn test_split_keeps_header_with_following_section() {
        let blob = "intro\nAnalysis for file: a.csv\nx\ny\nAnalysis for table: t\nz";

        let sections = split_into_sections(blob);
        assert_eq!(
            sections,
            vec![
                Section {
                    owning_table: UNKNOWN_TABLE,
                    lines: vec!["intro"],
                },
                Section {
                    owning_table: "a.csv",
                    lines: vec!["x", "y"],
                },
                Section {
                    owning_table: "t",
                    lines: vec!["z"],
                },
            ]
        );
    }

    #[test]
    fn test_no_preamble_section_when_blob_starts_with_header() {
        let sections = split_into_sections("Analysis for file: a.csv\n- Issue: x");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].owning_table, "a.csv");
    }

    #[test]
    fn test_headerless_blob_is_one_unknown_section() {
        let sections = split_into_sections("- Issue: x\n---\n- Issue: y");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].owning_table, UNKNOWN_TABLE);
        assert_eq!(sections[0].lines.len(), 3);
    }

    #[test]
    fn test_empty_blob_has_no_sections() {
        assert!(split_into_sections("").is_empty());
    }

    #[test]
    fn test_consecutive_headers_give_empty_sections() {
        let sections = split_into_sections("Analysis for file: a\nAnalysis for file: b\n");
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.lines.is_empty()));
    }

    #[test]
    fn test_crlf_lines() {
        let sections = split_into_sections("Analysis for file: a.csv\r\n- Issue: x\r\n");
        assert_eq!(sections[0].owning_table, "a.csv");
        assert_eq!(sections[0].lines, vec!["- Issue: x"]);
    }

    #[test]
    fn test_split_preamble() {
        let blob = "- Issue: x\r\n---\r\nAnalysis for file: a.csv\r\n- Issue: y\r\n";
        assert_eq!(
            split_preamble(blob),
            ("- Issue: x\r\n---\r\n", "Analysis for file: a.csv\r\n- Issue: y\r\n")
        );
        assert_eq!(split_preamble("- Issue: x"), ("- Issue: x", ""));
        assert_eq!(split_preamble("Analysis for table: t\n"), ("", "Analysis for table: t\n"));
    }

    #[test]
    fn test_split_into_subblocks() {
        let lines = vec!["a", "b", "---", "", "---", "c", "---"];

        let blocks = split_into_subblocks(&lines);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].lines, vec!["a", "b"]);
        assert!(blocks[1].is_blank());
        assert_eq!(blocks[2].lines, vec!["c"]);
        assert!(blocks[3].is_blank());
    }

    #[test]
    fn test_subblocks_of_empty_body() {
        let blocks = split_into_subblocks(&[]);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_blank());
    }
}
