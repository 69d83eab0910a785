//! LLM module - inference gateway integration
//!
//! Provides the provider abstraction with Ollama as the implementation.

pub mod ollama;
pub mod traits;

pub use ollama::OllamaClient;
pub use traits::{LLMProvider, LLMResponse, TokenUsage};
