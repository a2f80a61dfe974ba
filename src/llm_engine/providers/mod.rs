//! LLM Provider implementations
//!
//! Each provider implements the LlmProvider trait for a specific backend

pub mod gemini_provider;

pub use gemini_provider::GeminiProvider;
