//! OpenRouter backend implementation.
//!
//! This module provides the [`OpenRouterBackend`] which implements the
//! [`TextCompletionBackend`] trait for the OpenRouter API
//! (<https://openrouter.ai/>).
//!
//! OpenRouter exposes many LLM models behind one chat-completions endpoint,
//! which makes it a convenient alternative to a dedicated Azure deployment.

use super::http::{build_client, send_chat};
use super::{ChatRequest, CompletionRequest, TextCompletionBackend};
use crate::error::Result;
use reqwest::blocking::Client;
use tracing::debug;

/// Default OpenRouter API endpoint.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model used for narratives.
const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Configuration for the OpenRouter backend.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// The model to use (e.g., "deepseek/deepseek-chat", "openai/gpt-4o").
    pub model: String,
    /// Request timeout in seconds. `None` leaves timing to the service.
    pub timeout_secs: Option<u64>,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }
}

/// Builder for [`OpenRouterConfig`].
#[derive(Default)]
pub struct OpenRouterConfigBuilder {
    model: Option<String>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OpenRouterConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenRouterConfig {
        OpenRouterConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: self.timeout_secs,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// OpenRouter chat-completions backend.
///
/// # Example
///
/// ```rust,ignore
/// use dq_copilot::ai::{OpenRouterBackend, OpenRouterConfig};
///
/// // Simple usage with defaults
/// let backend = OpenRouterBackend::new("your-api-key")?;
///
/// // With custom configuration
/// let config = OpenRouterConfig::builder()
///     .model("openai/gpt-4o")
///     .timeout_secs(120)
///     .build();
/// let backend = OpenRouterBackend::with_config("your-api-key", config)?;
/// ```
pub struct OpenRouterBackend {
    api_key: String,
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterBackend {
    /// Create a new OpenRouter backend with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, OpenRouterConfig::default())
    }

    /// Create a new OpenRouter backend with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: OpenRouterConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }
}

impl TextCompletionBackend for OpenRouterBackend {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let body = ChatRequest::new(request, Some(&self.config.model));
        debug!(
            "Sending {} chars to OpenRouter model {}",
            request.user_prompt.len(),
            self.config.model
        );

        let http_request = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Data-Quality-Copilot")
            .json(&body);

        send_chat(http_request, self.name())
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}
