//! Backend trait for abstracting text-generation services.
//!
//! This module defines the [`TextCompletionBackend`] trait that enables
//! support for multiple chat-completion providers (Azure OpenAI, OpenRouter,
//! local stubs) without changing the narrative or remediation logic.
//!
//! # Implementing a New Backend
//!
//! 1. Create a new file in `src/ai/` (e.g., `ollama.rs`)
//! 2. Implement [`TextCompletionBackend`] for your backend struct
//! 3. Export the backend in `src/ai/mod.rs`

use crate::error::Result;

/// One completion call: a system prompt, a user prompt and sampling limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A service that turns prompts into free text.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a backend can be shared by the
/// session and the remediation advisor.
///
/// # Error Handling
///
/// Any failure (unreachable service, error status, unexpected envelope,
/// blank reply) must be reported as
/// [`CopilotError::NarrativeUnavailable`](crate::error::CopilotError::NarrativeUnavailable),
/// carrying the raw response body when one was received. Callers treat
/// that condition as "skip this section" rather than as fatal.
pub trait TextCompletionBackend: Send + Sync {
    /// Send one request and return the raw reply text.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;

    /// Get the backend name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model or deployment being used by this backend.
    ///
    /// Returns `None` if the backend doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
