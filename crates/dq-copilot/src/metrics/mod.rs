//! Column metrics module.
//!
//! This module computes deterministic per-column quality statistics
//! (completeness, uniqueness, text hygiene, format validity and numeric
//! sign checks) for a loaded [`Table`](crate::types::Table).

mod engine;

pub use engine::MetricsEngine;
