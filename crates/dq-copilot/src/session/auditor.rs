use super::Session;
use crate::config::{AnalysisScope, CopilotConfig};
use crate::error::{CopilotError, Result};
use crate::ingest;
use crate::metrics::MetricsEngine;
use crate::narrative::NarrativeRequester;
use crate::reporting::ReportWriter;
use crate::types::{MetricEntry, Table};
use crate::warehouse::{WarehouseConnector, select_sql};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Label used in failures of the cross-table request.
pub const CROSS_TABLE_LABEL: &str = "cross-table analysis";

/// A table (or the cross-table request) that did not make it through a pass.
#[derive(Debug, Serialize)]
pub struct TableFailure {
    pub table: String,
    pub error: CopilotError,
}

/// Outcome of one analysis pass.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Tables the pass attempted, including those that failed to load.
    pub tables_analyzed: usize,
    pub metrics: Vec<MetricEntry>,
    pub failures: Vec<TableFailure>,
    /// Issues parsed from the persisted narrative after the pass.
    pub issues_found: usize,
    pub narrative_path: PathBuf,
    pub metrics_path: PathBuf,
}

impl AnalysisReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record tables that failed to load before the pass started.
    pub fn prepend_load_failures(&mut self, mut failures: Vec<TableFailure>) {
        self.tables_analyzed += failures.len();
        failures.append(&mut self.failures);
        self.failures = failures;
    }
}

/// Runs analysis passes and persists their output.
///
/// Each pass computes metrics per table, requests the narratives the
/// configured [`AnalysisScope`] asks for, appends them to the narrative file
/// and reloads the session from that file.
pub struct Auditor<'a> {
    requester: &'a NarrativeRequester,
    config: &'a CopilotConfig,
    writer: ReportWriter,
}

impl<'a> Auditor<'a> {
    pub fn new(requester: &'a NarrativeRequester, config: &'a CopilotConfig) -> Self {
        Self {
            requester,
            config,
            writer: ReportWriter::from_config(config),
        }
    }

    pub fn writer(&self) -> &ReportWriter {
        &self.writer
    }

    /// Analyze `tables` and refresh `session`.
    ///
    /// A pass covering both scopes starts a fresh narrative file; a
    /// single-scope pass adds to the existing one. Cross-table text always
    /// goes ahead of the per-table sections already in the file.
    ///
    /// # Errors
    ///
    /// Only failures to read or write the output files are returned. Table
    /// and narrative failures are collected in the report.
    pub fn analyze(&self, session: &mut Session, tables: &[Table]) -> Result<AnalysisReport> {
        let scope = self.config.analysis_scope;
        info!(
            "Starting {:?} analysis of {} tables with {}",
            scope,
            tables.len(),
            self.requester.backend_name()
        );

        if scope == AnalysisScope::Both {
            self.writer.reset_narrative()?;
        }

        let mut failures = Vec::new();
        let snapshot_time = Utc::now();
        let mut metrics = Vec::new();
        let mut analyzable = Vec::with_capacity(tables.len());

        for table in tables {
            match MetricsEngine::compute_metrics_at(table, snapshot_time) {
                Ok(entries) => {
                    metrics.extend(entries);
                    analyzable.push(table.clone());
                }
                Err(error) => {
                    warn!("Skipping '{}': {}", table.name(), error);
                    failures.push(TableFailure {
                        table: table.name().to_string(),
                        error,
                    });
                }
            }
        }

        if scope.includes_cross_table() && !analyzable.is_empty() {
            match self.requester.request_cross_table(&analyzable) {
                Ok(text) => self.writer.prepend_preamble(&text)?,
                Err(error) => {
                    warn!("Cross-table narrative unavailable: {}", error);
                    failures.push(TableFailure {
                        table: CROSS_TABLE_LABEL.to_string(),
                        error,
                    });
                }
            }
        }

        if scope.includes_per_table() {
            for section in self.requester.request_sections(&analyzable) {
                match section.narrative {
                    Ok(text) => self.writer.append_section(Some(&section.header), &text)?,
                    Err(error) => {
                        warn!("Narrative for '{}' unavailable: {}", section.table, error);
                        failures.push(TableFailure {
                            table: section.table,
                            error,
                        });
                    }
                }
            }
        }

        self.writer.write_metrics(&metrics)?;
        session.load_narrative(self.read_narrative_or_empty()?);

        info!(
            "Analysis finished: {} issues, {} failures",
            session.issues().len(),
            failures.len()
        );

        Ok(AnalysisReport {
            tables_analyzed: tables.len(),
            metrics,
            failures,
            issues_found: session.issues().len(),
            narrative_path: self.writer.narrative_path().to_path_buf(),
            metrics_path: self.writer.metrics_path().to_path_buf(),
        })
    }

    /// Load CSV files and analyze the ones that loaded.
    ///
    /// # Errors
    ///
    /// A load error that is not scoped to its own file aborts the pass.
    /// Unreadable or malformed files are reported in the [`AnalysisReport`].
    pub fn analyze_files<P: AsRef<Path>>(
        &self,
        session: &mut Session,
        paths: &[P],
    ) -> Result<AnalysisReport> {
        let (tables, load_failures) = load_files(paths)?;
        let mut report = self.analyze(session, &tables)?;
        report.prepend_load_failures(load_failures);
        Ok(report)
    }

    /// Load every table of the configured schema and analyze them.
    ///
    /// # Errors
    ///
    /// A failed table listing aborts the pass with
    /// [`CopilotError::Connection`]. Failed queries of single tables are
    /// reported in the [`AnalysisReport`].
    pub fn analyze_warehouse(
        &self,
        session: &mut Session,
        connector: &dyn WarehouseConnector,
    ) -> Result<AnalysisReport> {
        let (tables, load_failures) = self.load_warehouse_tables(connector)?;
        let mut report = self.analyze(session, &tables)?;
        report.prepend_load_failures(load_failures);
        Ok(report)
    }

    /// Query every table of the configured schema.
    pub fn load_warehouse_tables(
        &self,
        connector: &dyn WarehouseConnector,
    ) -> Result<(Vec<Table>, Vec<TableFailure>)> {
        let schema = &self.config.default_schema;
        let names = connector.list_tables(schema)?;
        info!(
            "Loading {} tables from {} schema '{}'",
            names.len(),
            connector.name(),
            schema
        );

        let mut tables = Vec::with_capacity(names.len());
        let mut failures = Vec::new();
        for name in names {
            let sql = select_sql(schema, &name, self.config.row_limit);
            match connector.query(&sql, &name) {
                Ok(table) => tables.push(table),
                Err(error) => {
                    warn!("Could not load '{}': {}", name, error);
                    failures.push(TableFailure { table: name, error });
                }
            }
        }

        Ok((tables, failures))
    }

    fn read_narrative_or_empty(&self) -> Result<String> {
        if self.writer.narrative_path().exists() {
            self.writer.read_narrative()
        } else {
            Ok(String::new())
        }
    }
}

/// Load each CSV file, collecting the files that failed on their own.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<(Vec<Table>, Vec<TableFailure>)> {
    let mut tables = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match ingest::load_csv(path) {
            Ok(table) => tables.push(table),
            Err(error) if error.is_table_scoped() => {
                warn!("Could not load '{}': {}", path.display(), error);
                failures.push(TableFailure {
                    table: path.display().to_string(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    Ok((tables, failures))
}
