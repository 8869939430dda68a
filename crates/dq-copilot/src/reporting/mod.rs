//! Persisted outputs of an analysis pass.
//!
//! The narrative file is plain UTF-8 text: an optional cross-table preamble,
//! then one `Analysis for ...: <name>` section per table, each closed by a
//! line of 80 `=` characters. It is truncated at the start of a run and only
//! appended to afterwards. Metric entries are written next to it as a
//! pretty-printed JSON array.
//!
//! # Example
//!
//! ```rust,ignore
//! use dq_copilot::reporting::ReportWriter;
//!
//! let writer = ReportWriter::from_config(&config);
//! writer.reset_narrative()?;
//! writer.append_section(Some("Analysis for file: a.csv"), &narrative)?;
//! writer.write_metrics(&entries)?;
//! ```

mod writer;

pub use writer::ReportWriter;
