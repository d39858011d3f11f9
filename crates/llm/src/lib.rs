//! Draft Lens LLM
//!
//! Model provider abstraction for the Draft Lens engine:
//!
//! - `provider` - the `ModelProvider` trait every backend implements
//! - `ollama` - local inference over the Ollama REST API with
//!   constrained-decoding support
//! - `types` - request/response/error types shared by providers
//!
//! Providers expose independent execution channels: concurrent `complete`
//! calls never share mutable decoding state.

pub mod ollama;
pub mod provider;
pub mod types;

// Re-export main types
pub use ollama::{OllamaConfig, OllamaProvider};
pub use provider::{parse_http_error, ModelProvider};
pub use types::{
    ChatMessage, ChatRequest, CompletionResponse, LlmError, LlmResult, MessageRole, UsageStats,
};
