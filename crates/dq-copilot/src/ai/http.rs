//! Blocking transport shared by the HTTP backends.

use super::extract_content;
use crate::error::{CopilotError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

/// Build a blocking client.
///
/// Without a timeout the request blocks for as long as the remote service
/// keeps the connection open.
pub(super) fn build_client(timeout_secs: Option<u64>) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout_secs.map(Duration::from_secs))
        .build()?)
}

/// Send a prepared chat-completions request and return the reply text.
pub(super) fn send_chat(request: RequestBuilder, backend: &str) -> Result<String> {
    let response = request.send().map_err(|e| {
        CopilotError::narrative_unavailable(format!("{backend} request failed: {e}"))
    })?;

    let status = response.status();
    let body = response.text().map_err(|e| {
        CopilotError::narrative_unavailable(format!("{backend} response unreadable: {e}"))
    })?;
    debug!("{} responded with status {}", backend, status);

    if !status.is_success() {
        return Err(CopilotError::NarrativeUnavailable {
            reason: format!("{backend} API error {status}"),
            payload: Some(body),
        });
    }

    extract_content(&body)
}
