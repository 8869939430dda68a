//! Session state and analysis passes.
//!
//! A [`Session`] holds the most recent narrative blob and the issues parsed
//! from it. It is passed explicitly to whatever drives the audit; there is
//! no global state. An [`Auditor`] runs one synchronous analysis pass over a
//! batch of tables and refreshes the session from the persisted narrative.
//!
//! Failures are isolated per table: an unreadable file, an empty table or an
//! unavailable narrative section is recorded as a [`TableFailure`] and the rest of the
//! batch carries on.

mod auditor;
mod state;

pub use auditor::{AnalysisReport, Auditor, CROSS_TABLE_LABEL, TableFailure, load_files};
pub use state::Session;
