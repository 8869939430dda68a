//! Text-generation backends.
//!
//! This module provides a trait-based abstraction over chat-completion
//! services, so the narrative requester and the remediation advisor can run
//! against any backend, including deterministic stubs in tests.
//!
//! # Feature Flag
//!
//! The concrete HTTP backends require the `ai` feature flag. The
//! [`TextCompletionBackend`] trait and the response envelope parsing are
//! always available.
//!
//! ```toml
//! # Enable HTTP backends (default)
//! dq_copilot = { version = "0.1", features = ["ai"] }
//!
//! # Library only, bring your own backend
//! dq_copilot = { version = "0.1", default-features = false }
//! ```
//!
//! # Backends
//!
//! - [`AzureOpenAiBackend`] - Azure OpenAI deployment, `api-key` header (requires `ai` feature)
//! - [`OpenRouterBackend`] - OpenRouter API, bearer token (requires `ai` feature)
//!
//! Both speak the chat-completions protocol: the reply text is read from
//! `choices[0].message.content`, and any other shape is reported as
//! [`CopilotError::NarrativeUnavailable`](crate::error::CopilotError::NarrativeUnavailable).
//!
//! # Example
//!
//! ```rust,ignore
//! use dq_copilot::ai::{AzureOpenAiBackend, AzureOpenAiConfig};
//!
//! let config = AzureOpenAiConfig::builder()
//!     .endpoint("https://my-resource.openai.azure.com")
//!     .deployment("gpt-4o")
//!     .build();
//! let backend = AzureOpenAiBackend::new("api-key", config)?;
//! ```

// Backend trait and envelope handling are always available
mod envelope;
mod provider;

pub use envelope::{ChatMessage, ChatRequest, extract_content};
pub use provider::{CompletionRequest, TextCompletionBackend};

// Concrete backends require the "ai" feature
#[cfg(feature = "ai")]
mod azure;
#[cfg(feature = "ai")]
mod http;
#[cfg(feature = "ai")]
mod openrouter;

#[cfg(feature = "ai")]
pub use azure::{AzureOpenAiBackend, AzureOpenAiConfig, AzureOpenAiConfigBuilder};

#[cfg(feature = "ai")]
pub use openrouter::{OpenRouterBackend, OpenRouterConfig, OpenRouterConfigBuilder};
