//! LLM Provider trait and types
//!
//! Defines the common interface for hosted generative-text backends

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error types for LLM operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmError {
    /// API key missing or rejected
    AuthenticationFailed(String),
    /// Request failed (network, timeout, non-success status)
    RequestFailed(String),
    /// Response arrived but did not contain generated text
    InvalidResponse(String),
    /// Generic error
    Other(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            LlmError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            LlmError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            LlmError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

/// Request for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Full prompt text
    pub prompt: String,
    /// Maximum tokens to generate (None = model default)
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 = deterministic, 1.0+ = creative)
    pub temperature: Option<f32>,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            max_tokens: None,
            temperature: Some(0.7),
        }
    }
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text content
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Finish reason reported by the backend, if any
    pub finish_reason: Option<String>,
}

/// The trait every generative-text backend implements
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "gemini")
    fn provider_name(&self) -> &'static str;

    /// Run a single, non-streaming completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
