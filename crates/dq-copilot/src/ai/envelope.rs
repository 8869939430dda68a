//! Chat-completions request and response envelopes.

use super::CompletionRequest;
use crate::error::{CopilotError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body shared by the chat-completions backends.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a `[system, user]` message pair from a completion request.
    pub fn new(request: &CompletionRequest<'_>, model: Option<&str>) -> Self {
        Self {
            model: model.map(str::to_string),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.to_string(),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a raw response body.
///
/// Malformed JSON, a missing or empty `choices` array, a missing message and
/// blank content are all [`CopilotError::NarrativeUnavailable`], with the
/// raw body attached.
pub fn extract_content(raw: &str) -> Result<String> {
    let unavailable = |reason: &str| CopilotError::NarrativeUnavailable {
        reason: reason.to_string(),
        payload: Some(raw.to_string()),
    };

    let response: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| unavailable(&format!("malformed response envelope: {e}")))?;

    let choices = response
        .choices
        .ok_or_else(|| unavailable("response has no 'choices' field"))?;

    let content = choices
        .into_iter()
        .next()
        .ok_or_else(|| unavailable("response 'choices' array is empty"))?
        .message
        .and_then(|message| message.content)
        .ok_or_else(|| unavailable("first choice has no message content"))?;

    if content.trim().is_empty() {
        return Err(unavailable("backend returned empty content"));
    }

    Ok(content)
}
