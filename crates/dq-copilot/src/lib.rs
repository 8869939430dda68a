//! Data Quality Copilot Library
//!
//! An auditing assistant for tabular data, built with Rust and Polars.
//!
//! # Overview
//!
//! An audit pass over a batch of tables produces:
//!
//! - **Column Metrics**: completeness, uniqueness and text/numeric quality shares
//! - **Narratives**: LLM-written data quality findings, cross-table and per table
//! - **Structured Issues**: records parsed back out of the narrative text
//! - **Remediation**: annotations, custom fixes or LLM-proposed fixes per issue
//!
//! Tables come from CSV files ([`ingest`]) or a SQL warehouse ([`warehouse`]).
//! Nothing ever modifies the loaded data.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dq_copilot::ai::{AzureOpenAiBackend, AzureOpenAiConfig};
//! use dq_copilot::{Auditor, CopilotConfig, NarrativeRequester, RemediationAdvisor,
//!                  RemediationStrategy, Session, ingest};
//! use std::sync::Arc;
//!
//! let config = CopilotConfig::builder().max_tokens(2000).build()?;
//! let backend = Arc::new(AzureOpenAiBackend::new(api_key, azure_config)?);
//! let requester = NarrativeRequester::new(backend, &config);
//!
//! let tables = vec![ingest::load_csv("customers.csv")?, ingest::load_csv("orders.csv")?];
//! let mut session = Session::new();
//! let report = Auditor::new(&requester, &config).analyze(&mut session, &tables)?;
//!
//! for failure in &report.failures {
//!     println!("{}: {}", failure.table, failure.error);
//! }
//!
//! if let Some(issue) = session.select(0) {
//!     let fix = RemediationAdvisor::new(&requester).propose(issue, &RemediationStrategy::AutoFix);
//!     println!("{fix}");
//! }
//! ```
//!
//! # Text-Generation Backends
//!
//! Narratives come from any [`ai::TextCompletionBackend`]. Implemented backends:
//!
//! - [`ai::AzureOpenAiBackend`] - Azure OpenAI deployment
//! - [`ai::OpenRouterBackend`] - OpenRouter API
//!
//! # Parsing Narratives
//!
//! The parser is a pure function of the narrative text and can be used on
//! its own, e.g. on a previously persisted narrative file:
//!
//! ```rust,ignore
//! let issues = dq_copilot::parser::parse_issues_file("output/narrative_analysis.txt")?;
//! ```

pub mod ai;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod narrative;
pub mod parser;
pub mod remediation;
pub mod reporting;
pub mod session;
pub mod types;
pub mod utils;
pub mod warehouse;

// Re-exports for convenient access
pub use config::{AnalysisScope, ConfigValidationError, CopilotConfig, CopilotConfigBuilder};
pub use error::{CopilotError, Result as CopilotResult, ResultExt};
pub use metrics::MetricsEngine;
pub use narrative::NarrativeRequester;
pub use parser::{parse_issues, parse_issues_file};
pub use remediation::RemediationAdvisor;
pub use reporting::ReportWriter;
pub use session::{AnalysisReport, Auditor, Session, TableFailure};
pub use types::{
    IssueRecord, MetricEntry, NOT_AVAILABLE, NarrativeMode, RemediationStrategy, SourceKind,
    Table, UNKNOWN_TABLE,
};
pub use utils::{DtypeCategory, get_dtype_category, is_title_case, render_markdown_table};
pub use warehouse::WarehouseConnector;
