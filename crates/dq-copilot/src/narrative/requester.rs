use super::prompt::{ISSUE_SEPARATOR, cross_table_prompt, per_table_prompt};
use crate::ai::{CompletionRequest, TextCompletionBackend};
use crate::config::CopilotConfig;
use crate::error::{Result, ResultExt};
use crate::types::{NarrativeMode, Table};
use std::sync::Arc;
use tracing::{info, warn};

/// Visual rule closing every persisted narrative section.
pub const SECTION_RULE: &str =
    "================================================================================";

/// Format one narrative section: optional header line, body, closing rule.
///
/// A section without header is the cross-table preamble.
pub fn render_section(header: Option<&str>, body: &str) -> String {
    let mut section = String::new();
    if let Some(header) = header {
        section.push_str(header);
        section.push('\n');
    }
    section.push_str(body.trim_end());
    section.push('\n');
    section.push_str(SECTION_RULE);
    section.push('\n');
    section
}

/// Place headerless cross-table text ahead of `existing` narrative text.
///
/// Only text before the first section header belongs to the cross-table
/// preamble, so later cross-table output goes in front of earlier sections.
/// A separator line keeps the new text from merging into an earlier
/// preamble's first issue.
pub fn splice_preamble(existing: &str, preamble: &str) -> String {
    let mut narrative = String::with_capacity(existing.len() + preamble.len() + 5);
    narrative.push_str(preamble.trim_end());
    narrative.push('\n');
    if !existing.is_empty() {
        narrative.push_str(ISSUE_SEPARATOR);
        narrative.push('\n');
        narrative.push_str(existing);
    }
    narrative
}

/// Outcome of the per-table request for one table.
#[derive(Debug)]
pub struct SectionResult {
    pub table: String,
    pub header: String,
    pub narrative: Result<String>,
}

/// Obtains narratives from a text-generation backend.
///
/// Every call is blocking and runs to completion before returning.
pub struct NarrativeRequester {
    backend: Arc<dyn TextCompletionBackend>,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

static_assertions::assert_impl_all!(NarrativeRequester: Send, Sync);

impl NarrativeRequester {
    pub fn new(backend: Arc<dyn TextCompletionBackend>, config: &CopilotConfig) -> Self {
        Self {
            backend,
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Send an arbitrary user prompt with the configured system prompt.
    pub fn complete(&self, user_prompt: &str) -> Result<String> {
        self.backend.complete(&CompletionRequest {
            system_prompt: &self.system_prompt,
            user_prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        })
    }

    /// Request a narrative for `tables`.
    ///
    /// In [`NarrativeMode::CrossTable`] the reply to one prompt over all
    /// tables is returned as is; a backend failure is returned as the error.
    ///
    /// In [`NarrativeMode::PerTable`] one section per table is produced.
    /// Tables whose request fails are logged and left out, so the result
    /// holds only the sections that succeeded.
    pub fn request_narrative(&self, tables: &[Table], mode: NarrativeMode) -> Result<String> {
        match mode {
            NarrativeMode::CrossTable => self.request_cross_table(tables),
            NarrativeMode::PerTable => {
                let mut blob = String::new();
                for section in self.request_sections(tables) {
                    match section.narrative {
                        Ok(text) => blob.push_str(&render_section(Some(&section.header), &text)),
                        Err(e) => warn!("Skipping section for '{}': {}", section.table, e),
                    }
                }
                Ok(blob)
            }
        }
    }

    /// One global narrative about the relationships between `tables`.
    pub fn request_cross_table(&self, tables: &[Table]) -> Result<String> {
        let prompt = cross_table_prompt(tables)?;
        info!(
            "Requesting cross-table analysis of {} tables from {}",
            tables.len(),
            self.backend.name()
        );
        self.complete(&prompt).context("Cross-table analysis")
    }

    /// One request per table, each result reported separately.
    pub fn request_sections(&self, tables: &[Table]) -> Vec<SectionResult> {
        tables
            .iter()
            .map(|table| SectionResult {
                table: table.name().to_string(),
                header: table.section_header(),
                narrative: self.request_table(table),
            })
            .collect()
    }

    /// Narrative for a single table.
    pub fn request_table(&self, table: &Table) -> Result<String> {
        let prompt = per_table_prompt(table)?;
        info!("Requesting analysis for '{}'", table.name());
        self.complete(&prompt)
            .context(format!("Analysis for '{}'", table.name()))
    }
}
