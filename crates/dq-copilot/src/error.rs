//! Error types for the data quality copilot.
//!
//! The taxonomy follows the operator-facing failure modes of an audit pass:
//! an empty table, an unreachable warehouse, and an unavailable narrative.
//! Titleless issue sub-blocks are not errors at all; the parser drops them.
//!
//! Errors are serializable as `{code, message}` so a front-end shell can
//! render them without matching on Rust types.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the copilot.
#[derive(Error, Debug)]
pub enum CopilotError {
    /// Metrics are undefined for a table with zero rows.
    #[error("Table '{table}' has no rows; metrics are undefined")]
    EmptyTable { table: String },

    /// Warehouse unreachable or credentials rejected.
    #[error("Warehouse connection failed: {0}")]
    Connection(String),

    /// The text-generation backend failed or returned an unusable envelope.
    ///
    /// `payload` carries the raw backend response (when there was one) for
    /// diagnostics.
    #[error("Narrative unavailable: {reason}")]
    NarrativeUnavailable {
        reason: String,
        payload: Option<String>,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (backends and warehouse connector).
    #[cfg(any(feature = "ai", feature = "warehouse"))]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CopilotError>,
    },
}

impl CopilotError {
    /// Shorthand for a [`CopilotError::NarrativeUnavailable`] without payload.
    pub fn narrative_unavailable(reason: impl Into<String>) -> Self {
        Self::NarrativeUnavailable {
            reason: reason.into(),
            payload: None,
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CopilotError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTable { .. } => "EMPTY_TABLE",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::NarrativeUnavailable { .. } => "NARRATIVE_UNAVAILABLE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(any(feature = "ai", feature = "warehouse"))]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Raw backend payload attached to a narrative failure, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::NarrativeUnavailable { payload, .. } => payload.as_deref(),
            Self::WithContext { source, .. } => source.payload(),
            _ => None,
        }
    }

    /// Check if this error is a narrative failure.
    pub fn is_narrative_unavailable(&self) -> bool {
        self.error_code() == "NARRATIVE_UNAVAILABLE"
    }

    /// Check if this error only affects the current table of a batch.
    ///
    /// Batch loaders record table-scoped errors and carry on; any other
    /// error aborts the pass.
    pub fn is_table_scoped(&self) -> bool {
        match self {
            Self::Connection(_) | Self::InvalidConfig(_) => false,
            Self::WithContext { source, .. } => source.is_table_scoped(),
            _ => true,
        }
    }
}

/// Serialize implementation for front-end compatibility.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CopilotError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CopilotError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for copilot operations.
pub type Result<T> = std::result::Result<T, CopilotError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CopilotError::Polars(e).with_context(context))
    }
}
