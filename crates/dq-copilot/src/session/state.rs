use crate::narrative::splice_preamble;
use crate::parser::{parse_issues, split_preamble};
use crate::types::IssueRecord;
use tracing::debug;

/// The current narrative and its parsed issues.
///
/// The issue list is always derived from the narrative; every mutation of
/// the narrative re-parses it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    narrative: String,
    issues: Vec<IssueRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with an existing narrative, e.g. a persisted file.
    pub fn from_narrative(narrative: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.load_narrative(narrative);
        session
    }

    /// Replace the narrative.
    pub fn load_narrative(&mut self, narrative: impl Into<String>) {
        self.narrative = narrative.into();
        self.reparse();
    }

    /// Add text from a later pass to the narrative.
    ///
    /// Headerless leading text is cross-table output and goes ahead of the
    /// existing sections; everything from the first header on is appended.
    pub fn append_narrative(&mut self, text: &str) {
        let (preamble, sections) = split_preamble(text);
        if !preamble.trim().is_empty() {
            self.narrative = splice_preamble(&self.narrative, preamble);
        }
        if !sections.is_empty() {
            if !self.narrative.is_empty() && !self.narrative.ends_with('\n') {
                self.narrative.push('\n');
            }
            self.narrative.push_str(sections);
        }
        self.reparse();
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn issues(&self) -> &[IssueRecord] {
        &self.issues
    }

    /// Issue at `index` in parse order.
    pub fn select(&self, index: usize) -> Option<&IssueRecord> {
        self.issues.get(index)
    }

    pub fn clear(&mut self) {
        self.narrative.clear();
        self.issues.clear();
    }

    fn reparse(&mut self) {
        self.issues = parse_issues(&self.narrative);
        debug!("Session holds {} issues", self.issues.len());
    }
}
