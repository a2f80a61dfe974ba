//! LLM Engine module for AI-powered content scoring
//!
//! Backends:
//! - Gemini API (requires an API key)

pub mod provider;
pub mod providers;

pub use provider::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
