//! Azure OpenAI backend implementation.
//!
//! Requests go to a model deployment's chat-completions route and
//! authenticate with the `api-key` header.

use super::http::{build_client, send_chat};
use super::{ChatRequest, CompletionRequest, TextCompletionBackend};
use crate::error::{CopilotError, Result};
use reqwest::blocking::Client;
use tracing::debug;

/// API version pinned for the chat-completions route.
const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Configuration for the Azure OpenAI backend.
#[derive(Debug, Clone, Default)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    /// Deployment name of the chat model.
    pub deployment: String,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Request timeout in seconds. `None` leaves timing to the service.
    pub timeout_secs: Option<u64>,
}

impl AzureOpenAiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AzureOpenAiConfigBuilder {
        AzureOpenAiConfigBuilder::default()
    }

    /// Full chat-completions URL for the configured deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Builder for [`AzureOpenAiConfig`].
#[derive(Default)]
pub struct AzureOpenAiConfigBuilder {
    endpoint: Option<String>,
    deployment: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

impl AzureOpenAiConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn build(self) -> AzureOpenAiConfig {
        AzureOpenAiConfig {
            endpoint: self.endpoint.unwrap_or_default(),
            deployment: self.deployment.unwrap_or_default(),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Azure OpenAI chat-completions backend.
pub struct AzureOpenAiBackend {
    api_key: String,
    config: AzureOpenAiConfig,
    client: Client,
}

impl AzureOpenAiBackend {
    /// Create a backend for one deployment.
    ///
    /// # Errors
    ///
    /// Returns [`CopilotError::InvalidConfig`] if the endpoint or deployment
    /// is missing, or an HTTP error if the client cannot be created.
    pub fn new(api_key: impl Into<String>, config: AzureOpenAiConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(CopilotError::InvalidConfig(
                "Azure OpenAI endpoint is required".to_string(),
            ));
        }
        if config.deployment.trim().is_empty() {
            return Err(CopilotError::InvalidConfig(
                "Azure OpenAI deployment is required".to_string(),
            ));
        }

        let client = build_client(config.timeout_secs)?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }
}

impl TextCompletionBackend for AzureOpenAiBackend {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let body = ChatRequest::new(request, None);
        debug!(
            "Sending {} chars to Azure deployment {}",
            request.user_prompt.len(),
            self.config.deployment
        );

        let http_request = self
            .client
            .post(self.config.completions_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body);

        send_chat(http_request, self.name())
    }

    fn name(&self) -> &str {
        "Azure OpenAI"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AzureOpenAiConfig {
        AzureOpenAiConfig::builder()
            .endpoint("https://contoso.openai.azure.com/")
            .deployment("gpt-4o")
            .build()
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            config().completions_url(),
            "https://contoso.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-12-01-preview"
        );
    }

    #[test]
    fn test_custom_api_version() {
        let config = AzureOpenAiConfig::builder()
            .endpoint("https://x")
            .deployment("d")
            .api_version("2025-01-01")
            .build();
        assert!(config.completions_url().ends_with("api-version=2025-01-01"));
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let config = AzureOpenAiConfig::builder().deployment("gpt-4o").build();
        let result = AzureOpenAiBackend::new("key", config);
        assert!(matches!(result, Err(CopilotError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_deployment_rejected() {
        let config = AzureOpenAiConfig::builder().endpoint("https://x").build();
        let result = AzureOpenAiBackend::new("key", config);
        assert!(matches!(result, Err(CopilotError::InvalidConfig(_))));
    }

    #[test]
    fn test_backend_reports_deployment_as_model() {
        let backend = AzureOpenAiBackend::new("key", config()).unwrap();
        assert_eq!(backend.name(), "Azure OpenAI");
        assert_eq!(backend.model(), Some("gpt-4o"));
    }
}
