//! Model Provider Trait
//!
//! Defines the common interface the engine uses to talk to a loaded model.

use async_trait::async_trait;

use super::types::{ChatRequest, CompletionResponse, LlmError, LlmResult};

/// Trait that all model providers must implement.
///
/// A provider represents one loaded model exposing independent execution
/// channels: every `complete` call is a self-contained generation with no
/// mutable state shared between concurrent calls. The engine relies on this
/// to fan four facet pipelines out against one provider.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the model being served.
    fn model(&self) -> &str;

    /// Run one generation call to completion.
    ///
    /// When `request.grammar` is set, the provider must pass it to the
    /// decoder as a structural output constraint.
    async fn complete(&self, request: ChatRequest) -> LlmResult<CompletionResponse>;

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Map an HTTP error status to an `LlmError`.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        400 => LlmError::InvalidRequest {
            message: format!("{}: {}", provider, body),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}
