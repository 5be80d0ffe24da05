//! LLM provider abstractions for rubricate-runtime.
//!
//! This module defines the trait every AI backend implements and ships an
//! OpenAI-compatible chat-completions provider (OpenRouter by default).
//!
//! ## Security
//!
//! Providers hold API keys in [`ApiCredential`], which redacts itself in
//! `Debug` output. See the [`secrets`] module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
mod openrouter;
pub mod secrets;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use openrouter::{OpenRouterProvider, OpenRouterProviderFactory, OPENROUTER_API_KEY_ENV};
pub use secrets::{ApiCredential, CredentialSource};

/// Transport-level failures talking to an AI provider.
///
/// Any of these means no usable text came back from the service.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Per-request settings sent with every AI call.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model identifier sent with every request
    pub model: String,

    /// Maximum tokens to generate (provider default when unset)
    pub max_tokens: Option<u32>,

    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,

    /// Bounded wait per call
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "openrouter/quasar-alpha".to_string(),
            max_tokens: None,
            temperature: None,
            timeout: Duration::from_secs(45),
        }
    }
}

/// One message in a chat-completions request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Always "user" for requests built here
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// What came back from one AI call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content, untrusted
    pub content: String,

    /// Token usage (zeros when the provider omits it)
    pub usage: TokenUsage,

    /// Model that served the request
    pub model: String,
}

/// Token counts reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// An AI backend. Implementations are the only code that touches the network.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check if provider is usable (credentials present).
    async fn health_check(&self) -> bool;

    /// Get provider name for logs.
    fn name(&self) -> &str;
}
