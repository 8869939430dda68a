//! Configuration types for the data quality copilot.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic session setup. Credentials are not part of
//! this configuration; the binary reads them from the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default system prompt sent with every completion request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in the field of data quality analysis.";

/// Which analysis passes an audit run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnalysisScope {
    /// One global narrative over all tables
    CrossTable,
    /// One narrative section per table
    PerTable,
    /// Cross-table narrative followed by per-table sections
    #[default]
    Both,
}

impl AnalysisScope {
    pub fn includes_cross_table(self) -> bool {
        matches!(self, Self::CrossTable | Self::Both)
    }

    pub fn includes_per_table(self) -> bool {
        matches!(self, Self::PerTable | Self::Both)
    }
}

/// Configuration for an audit session.
///
/// Use [`CopilotConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use dq_copilot::config::{AnalysisScope, CopilotConfig};
///
/// let config = CopilotConfig::builder()
///     .max_tokens(4000)
///     .analysis_scope(AnalysisScope::PerTable)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopilotConfig {
    /// Maximum tokens requested from the text-generation backend.
    /// Default: 2000
    pub max_tokens: u32,

    /// Sampling temperature (0.0 - 2.0).
    /// Default: 0.7
    pub temperature: f32,

    /// System prompt sent with every request.
    pub system_prompt: String,

    /// Which analysis passes to run.
    /// Default: Both
    pub analysis_scope: AnalysisScope,

    /// Directory for the persisted narrative and metrics files.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// File name of the persisted narrative inside `output_dir`.
    /// Default: "narrative_analysis.txt"
    pub narrative_file_name: String,

    /// File name of the metrics JSON inside `output_dir`.
    /// Default: "metrics.json"
    pub metrics_file_name: String,

    /// Optional `LIMIT` applied to warehouse table queries.
    /// Default: None (whole table)
    pub row_limit: Option<usize>,

    /// Schema searched for tables when connecting to a warehouse.
    /// Default: "default"
    pub default_schema: String,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            analysis_scope: AnalysisScope::default(),
            output_dir: PathBuf::from("output"),
            narrative_file_name: "narrative_analysis.txt".to_string(),
            metrics_file_name: "metrics.json".to_string(),
            row_limit: None,
            default_schema: "default".to_string(),
        }
    }
}

impl CopilotConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CopilotConfigBuilder {
        CopilotConfigBuilder::default()
    }

    /// Full path of the persisted narrative file.
    pub fn narrative_path(&self) -> PathBuf {
        self.output_dir.join(&self.narrative_file_name)
    }

    /// Full path of the metrics file.
    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir.join(&self.metrics_file_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens(self.max_tokens));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(self.temperature));
        }

        if self.row_limit == Some(0) {
            return Err(ConfigValidationError::InvalidRowLimit);
        }

        for (field, value) in [
            ("narrative_file_name", &self.narrative_file_name),
            ("metrics_file_name", &self.metrics_file_name),
            ("default_schema", &self.default_schema),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyField(field.to_string()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid max_tokens: {0} (must be at least 1)")]
    InvalidMaxTokens(u32),

    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),

    #[error("Invalid row limit: must be at least 1 when set")]
    InvalidRowLimit,

    #[error("Configuration field '{0}' must not be empty")]
    EmptyField(String),
}

impl From<ConfigValidationError> for crate::error::CopilotError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::CopilotError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CopilotConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CopilotConfigBuilder {
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
    analysis_scope: Option<AnalysisScope>,
    output_dir: Option<PathBuf>,
    narrative_file_name: Option<String>,
    metrics_file_name: Option<String>,
    row_limit: Option<usize>,
    default_schema: Option<String>,
}

impl CopilotConfigBuilder {
    /// Set the maximum tokens requested per completion.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Replace the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Choose which analysis passes run.
    pub fn analysis_scope(mut self, scope: AnalysisScope) -> Self {
        self.analysis_scope = Some(scope);
        self
    }

    /// Set the output directory for the narrative and metrics files.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the narrative file name.
    pub fn narrative_file_name(mut self, name: impl Into<String>) -> Self {
        self.narrative_file_name = Some(name.into());
        self
    }

    /// Set the metrics file name.
    pub fn metrics_file_name(mut self, name: impl Into<String>) -> Self {
        self.metrics_file_name = Some(name.into());
        self
    }

    /// Limit the rows fetched per warehouse table.
    pub fn row_limit(mut self, limit: usize) -> Self {
        self.row_limit = Some(limit);
        self
    }

    /// Set the schema used for warehouse table discovery.
    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CopilotConfig` or an error if validation fails.
    pub fn build(self) -> Result<CopilotConfig, ConfigValidationError> {
        let defaults = CopilotConfig::default();
        let config = CopilotConfig {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            system_prompt: self.system_prompt.unwrap_or(defaults.system_prompt),
            analysis_scope: self.analysis_scope.unwrap_or_default(),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            narrative_file_name: self
                .narrative_file_name
                .unwrap_or(defaults.narrative_file_name),
            metrics_file_name: self.metrics_file_name.unwrap_or(defaults.metrics_file_name),
            row_limit: self.row_limit,
            default_schema: self.default_schema.unwrap_or(defaults.default_schema),
        };

        config.validate()?;
        Ok(config)
    }
}
