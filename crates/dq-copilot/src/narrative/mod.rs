//! Narrative requests.
//!
//! This module builds the fixed-template analysis prompts from loaded tables
//! and obtains free-text narratives from a
//! [`TextCompletionBackend`](crate::ai::TextCompletionBackend).
//!
//! # Narrative layout
//!
//! A per-table narrative is a sequence of sections. Each section starts
//! with an `Analysis for file: <name>` or `Analysis for table: <name>` header
//! line, carries the backend reply and ends with a line of 80 `=`. Inside a
//! reply, issues are separated by lines consisting of `---`:
//!
//! ```text
//! Analysis for file: orders.csv
//! - **Issue:** Duplicate order ids
//! - Details: 3 ids appear twice
//! ---
//! - Issue: Negative quantities
//! ================================================================================
//! ```

mod prompt;
mod requester;

pub use prompt::{ISSUE_SEPARATOR, cross_table_prompt, per_table_prompt};
pub use requester::{
    NarrativeRequester, SECTION_RULE, SectionResult, render_section, splice_preamble,
};
