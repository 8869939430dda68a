use crate::config::CopilotConfig;
use crate::error::{CopilotError, Result, ResultExt};
use crate::narrative::{render_section, splice_preamble};
use crate::types::MetricEntry;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes the narrative file and the metrics file of a run.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    narrative_path: PathBuf,
    metrics_path: PathBuf,
}

impl ReportWriter {
    pub fn new(narrative_path: impl Into<PathBuf>, metrics_path: impl Into<PathBuf>) -> Self {
        Self {
            narrative_path: narrative_path.into(),
            metrics_path: metrics_path.into(),
        }
    }

    /// Writer for the paths configured in `config`.
    pub fn from_config(config: &CopilotConfig) -> Self {
        Self::new(config.narrative_path(), config.metrics_path())
    }

    pub fn narrative_path(&self) -> &Path {
        &self.narrative_path
    }

    pub fn metrics_path(&self) -> &Path {
        &self.metrics_path
    }

    /// Truncate the narrative file, creating it and its directory if needed.
    pub fn reset_narrative(&self) -> Result<()> {
        ensure_parent(&self.narrative_path)?;
        File::create(&self.narrative_path)
            .map_err(CopilotError::from)
            .context(format!("Truncating {}", self.narrative_path.display()))?;
        debug!("Reset narrative file {}", self.narrative_path.display());
        Ok(())
    }

    /// Append one section: optional header, body, closing rule.
    pub fn append_section(&self, header: Option<&str>, body: &str) -> Result<()> {
        ensure_parent(&self.narrative_path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.narrative_path)
            .map_err(CopilotError::from)
            .context(format!("Opening {}", self.narrative_path.display()))?;
        file.write_all(render_section(header, body).as_bytes())?;
        Ok(())
    }

    /// Write a headerless cross-table section ahead of any existing sections.
    pub fn prepend_preamble(&self, body: &str) -> Result<()> {
        let existing = if self.narrative_path.exists() {
            self.read_narrative()?
        } else {
            String::new()
        };

        ensure_parent(&self.narrative_path)?;
        let narrative = splice_preamble(&existing, &render_section(None, body));
        fs::write(&self.narrative_path, narrative)
            .map_err(CopilotError::from)
            .context(format!("Writing {}", self.narrative_path.display()))
    }

    /// Full text of the narrative file.
    pub fn read_narrative(&self) -> Result<String> {
        fs::read_to_string(&self.narrative_path)
            .map_err(CopilotError::from)
            .context(format!("Reading {}", self.narrative_path.display()))
    }

    /// Write `entries` as a JSON array, replacing any previous file.
    pub fn write_metrics(&self, entries: &[MetricEntry]) -> Result<()> {
        ensure_parent(&self.metrics_path)?;
        let mut file = File::create(&self.metrics_path)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;

        info!(
            "Metrics saved: {} ({} entries)",
            self.metrics_path.display(),
            entries.len()
        );
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::SECTION_RULE;
    use crate::parser::parse_issues;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn writer(dir: &Path) -> ReportWriter {
        ReportWriter::new(dir.join("out/narrative.txt"), dir.join("out/metrics.json"))
    }

    #[test]
    fn test_sections_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());

        writer.reset_narrative().unwrap();
        writer.append_section(None, "- Issue: Orphan orders\n").unwrap();
        writer
            .append_section(Some("Analysis for file: a.csv"), "- Issue: Dup rows")
            .unwrap();

        let text = writer.read_narrative().unwrap();
        assert_eq!(
            text,
            format!(
                "- Issue: Orphan orders\n{SECTION_RULE}\nAnalysis for file: a.csv\n- Issue: Dup rows\n{SECTION_RULE}\n"
            )
        );

        let issues = parse_issues(&text);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].owning_table, "Unknown");
        assert_eq!(issues[1].owning_table, "a.csv");
    }

    #[test]
    fn test_preamble_goes_ahead_of_existing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());

        writer.prepend_preamble("- Issue: First cross").unwrap();
        writer
            .append_section(Some("Analysis for file: a.csv"), "- Issue: Dup rows")
            .unwrap();
        writer.prepend_preamble("- Issue: Second cross").unwrap();

        let issues = parse_issues(&writer.read_narrative().unwrap());
        let summary: Vec<_> = issues
            .iter()
            .map(|i| (i.owning_table.as_str(), i.title.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Unknown", "Second cross"),
                ("Unknown", "First cross"),
                ("a.csv", "Dup rows"),
            ]
        );
    }

    #[test]
    fn test_reset_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());

        writer.append_section(Some("Analysis for file: old.csv"), "x").unwrap();
        writer.reset_narrative().unwrap();

        assert_eq!(writer.read_narrative().unwrap(), "");
    }

    #[test]
    fn test_write_metrics_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let entries = vec![MetricEntry::new("t", "id", Utc::now(), 100.0, 75.0)];

        writer.write_metrics(&entries).unwrap();

        let raw = fs::read_to_string(writer.metrics_path()).unwrap();
        let back: Vec<MetricEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn test_read_missing_narrative() {
        let dir = tempfile::tempdir().unwrap();
        let err = writer(dir.path()).read_narrative().unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
