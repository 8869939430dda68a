use crate::narrative::NarrativeRequester;
use crate::types::{IssueRecord, NOT_AVAILABLE, RemediationStrategy};
use tracing::{info, warn};

/// Prompt asking the backend for one "Recommended Fix" section for `issue`.
pub fn remediation_prompt(issue: &IssueRecord) -> String {
    let mut prompt = format!(
        "The following data quality issue was found in '{}':\n\n",
        issue.owning_table
    );
    for (label, value) in issue.display_fields().iter().skip(1) {
        prompt.push_str(&format!("- {label}: {value}\n"));
    }
    prompt.push_str(
        "\nPropose how to fix this issue. Reply with a single section titled \
         \"Recommended Fix\" that describes the correction step by step, and \
         the validation rule that would prevent it from recurring. \
         Do not repeat the issue description.\n",
    );
    prompt
}

/// Turns an issue plus a strategy into a remediation text.
///
/// Without a requester, [`RemediationStrategy::AutoFix`] yields a failure
/// notice; the local strategies work either way.
pub struct RemediationAdvisor<'a> {
    requester: Option<&'a NarrativeRequester>,
}

impl<'a> RemediationAdvisor<'a> {
    pub fn new(requester: &'a NarrativeRequester) -> Self {
        Self {
            requester: Some(requester),
        }
    }

    /// Advisor for the local strategies only.
    pub fn offline() -> Self {
        Self { requester: None }
    }

    /// Produce the remediation text for `issue`. Never fails.
    pub fn propose(&self, issue: &IssueRecord, strategy: &RemediationStrategy) -> String {
        info!(
            "Proposing {} remediation for '{}'",
            strategy.tag(),
            issue.title
        );
        match strategy {
            RemediationStrategy::Annotate => annotate(issue),
            RemediationStrategy::Custom(text) => custom(issue, text),
            RemediationStrategy::AutoFix => self.auto_fix(issue),
        }
    }

    fn auto_fix(&self, issue: &IssueRecord) -> String {
        let Some(requester) = self.requester else {
            return failure_notice(issue, "no text-generation backend configured");
        };

        match requester.complete(&remediation_prompt(issue)) {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                warn!("Auto-fix for '{}' failed: {}", issue.title, e);
                failure_notice(issue, &e.to_string())
            }
        }
    }
}

fn annotate(issue: &IssueRecord) -> String {
    format!(
        "Annotation for issue '{}':\n{}",
        issue.title,
        issue.details.as_deref().unwrap_or(NOT_AVAILABLE)
    )
}

fn custom(issue: &IssueRecord, text: &str) -> String {
    format!("Custom fix for issue '{}':\n{}", issue.title, text)
}

fn failure_notice(issue: &IssueRecord, detail: &str) -> String {
    format!(
        "Could not generate a fix for issue '{}': {}",
        issue.title, detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionRequest, TextCompletionBackend};
    use crate::config::CopilotConfig;
    use crate::error::{CopilotError, Result};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Records the last prompt and replies with a fixed text or an error.
    struct StubBackend {
        reply: Option<&'static str>,
        last_prompt: Mutex<String>,
    }

    impl TextCompletionBackend for StubBackend {
        fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
            if let Ok(mut last) = self.last_prompt.lock() {
                *last = request.user_prompt.to_string();
            }
            self.reply
                .map(str::to_string)
                .ok_or_else(|| CopilotError::narrative_unavailable("empty choices"))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn stub(reply: Option<&'static str>) -> Arc<StubBackend> {
        Arc::new(StubBackend {
            reply,
            last_prompt: Mutex::new(String::new()),
        })
    }

    fn issue() -> IssueRecord {
        let mut issue = IssueRecord::new("orders.csv", "Negative quantity");
        issue.details = Some("qty is -3 on row 7".to_string());
        issue.location = Some("column qty".to_string());
        issue
    }

    #[test]
    fn test_annotate_embeds_details() {
        let text = RemediationAdvisor::offline().propose(&issue(), &RemediationStrategy::Annotate);
        assert_eq!(
            text,
            "Annotation for issue 'Negative quantity':\nqty is -3 on row 7"
        );
    }

    #[test]
    fn test_annotate_without_details_uses_sentinel() {
        let issue = IssueRecord::new("t", "x");
        let text = RemediationAdvisor::offline().propose(&issue, &RemediationStrategy::Annotate);
        assert!(text.ends_with(NOT_AVAILABLE));
    }

    #[test]
    fn test_custom_text_is_verbatim() {
        let advisor = RemediationAdvisor::offline();
        let text = advisor.propose(
            &issue(),
            &RemediationStrategy::Custom("  set qty = abs(qty)\n".to_string()),
        );
        assert_eq!(
            text,
            "Custom fix for issue 'Negative quantity':\n  set qty = abs(qty)\n"
        );

        let empty = advisor.propose(&issue(), &RemediationStrategy::Custom(String::new()));
        assert_eq!(empty, "Custom fix for issue 'Negative quantity':\n");
    }

    #[test]
    fn test_prompt_embeds_every_field() {
        let prompt = remediation_prompt(&issue());
        assert!(prompt.contains("'orders.csv'"));
        assert!(prompt.contains("- Issue: Negative quantity\n"));
        assert!(prompt.contains("- Details: qty is -3 on row 7\n"));
        assert!(prompt.contains("- Expected correct state: Not available\n"));
        assert!(prompt.contains("- Location: column qty\n"));
        assert!(prompt.contains("- Guideline violated: Not available\n"));
        assert!(prompt.contains("\"Recommended Fix\""));
    }

    #[test]
    fn test_auto_fix_returns_backend_reply() {
        let backend = stub(Some("Recommended Fix\n- Take the absolute value.\n"));
        let config = CopilotConfig::default();
        let requester = NarrativeRequester::new(backend.clone(), &config);

        let text = RemediationAdvisor::new(&requester).propose(&issue(), &RemediationStrategy::AutoFix);

        assert_eq!(text, "Recommended Fix\n- Take the absolute value.");
        let sent = backend.last_prompt.lock().unwrap().clone();
        assert!(sent.contains("Negative quantity"));
    }

    #[test]
    fn test_auto_fix_failure_is_a_notice() {
        let config = CopilotConfig::default();
        let requester = NarrativeRequester::new(stub(None), &config);

        let text = RemediationAdvisor::new(&requester).propose(&issue(), &RemediationStrategy::AutoFix);

        assert!(text.starts_with("Could not generate a fix for issue 'Negative quantity':"));
        assert!(text.contains("empty choices"));
    }

    #[test]
    fn test_auto_fix_offline_is_a_notice() {
        let text = RemediationAdvisor::offline().propose(&issue(), &RemediationStrategy::AutoFix);
        assert!(text.contains("no text-generation backend configured"));
    }
}
