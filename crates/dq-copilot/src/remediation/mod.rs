//! Remediation proposals for a single parsed issue.
//!
//! Remediation is always a recommendation: nothing here touches table data.
//! [`RemediationStrategy::Annotate`] and [`RemediationStrategy::Custom`] are
//! formatted locally; [`RemediationStrategy::AutoFix`] asks the narrative
//! backend for a "Recommended Fix" section.
//!
//! [`RemediationStrategy::Annotate`]: crate::types::RemediationStrategy::Annotate
//! [`RemediationStrategy::Custom`]: crate::types::RemediationStrategy::Custom
//! [`RemediationStrategy::AutoFix`]: crate::types::RemediationStrategy::AutoFix

mod advisor;

pub use advisor::{RemediationAdvisor, remediation_prompt};
