//! Ollama Provider
//!
//! Implementation of the `ModelProvider` trait against a local Ollama
//! server's REST API. Requests run non-streaming with `format` carrying the
//! constrained-decoding JSON schema, so the decoder enforces the declared
//! output shape token by token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{parse_http_error, ModelProvider};
use super::types::{
    ChatMessage, ChatRequest, CompletionResponse, LlmError, LlmResult, MessageRole, UsageStats,
};

/// Default Ollama API endpoint
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Configuration for the Ollama provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Model name to use
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL override (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_model() -> String {
    "llama3.2".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
        }
    }
}

/// Ollama provider for local inference
pub struct OllamaProvider {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given configuration
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Get the base URL for the Ollama server
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OLLAMA_DEFAULT_URL)
    }

    fn map_send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_connect() {
            LlmError::ProviderUnavailable {
                message: format!("Cannot connect to Ollama at {}: {}", self.base_url(), err),
            }
        } else {
            LlmError::NetworkError {
                message: err.to_string(),
            }
        }
    }

    /// Build the wire request from our unified types
    fn build_api_request(&self, request: &ChatRequest) -> ApiChatRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| ApiMessage {
                role: role_str(m),
                content: m.content.clone(),
            })
            .collect();

        ApiChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: false,
            format: request.grammar.clone(),
            options: ApiOptions {
                temperature: request.sampling.temperature,
                num_predict: request.sampling.max_tokens as i32,
            },
        }
    }
}

fn role_str(message: &ChatMessage) -> &'static str {
    match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: ChatRequest) -> LlmResult<CompletionResponse> {
        let url = format!("{}/api/chat", self.base_url());
        let api_request = self.build_api_request(&request);

        debug!(
            model = %api_request.model,
            constrained = api_request.format.is_some(),
            "ollama: sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &body, "ollama"));
        }

        let api_response: ApiChatResponse = response.json().await.map_err(|e| {
            LlmError::ParseError {
                message: format!("Failed to decode Ollama response body: {}", e),
            }
        })?;

        Ok(CompletionResponse {
            content: api_response.message.content,
            model: api_response.model,
            usage: UsageStats {
                input_tokens: api_response.prompt_eval_count.unwrap_or(0) as u32,
                output_tokens: api_response.eval_count.unwrap_or(0) as u32,
            },
        })
    }

    async fn health_check(&self) -> LlmResult<()> {
        let url = format!("{}/api/tags", self.base_url());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &body, "ollama"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
    /// JSON schema for structured outputs; Ollama constrains decoding to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ApiOptions {
    temperature: f32,
    num_predict: i32,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    model: String,
    message: ApiResponseMessage,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_lens_core::SamplingParams;

    fn test_config() -> OllamaConfig {
        OllamaConfig {
            model: "llama3.2".to_string(),
            base_url: Some("http://localhost:11434".to_string()),
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = OllamaProvider::new(test_config());
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3.2");
    }

    #[test]
    fn test_base_url_default_and_override() {
        let provider = OllamaProvider::new(OllamaConfig::default());
        assert_eq!(provider.base_url(), "http://localhost:11434");

        let config = OllamaConfig {
            base_url: Some("http://192.168.1.100:11434".to_string()),
            ..test_config()
        };
        let provider = OllamaProvider::new(config);
        assert_eq!(provider.base_url(), "http://192.168.1.100:11434");
    }

    #[test]
    fn test_build_api_request_carries_grammar_and_sampling() {
        let provider = OllamaProvider::new(test_config());
        let request = ChatRequest::new(vec![
            ChatMessage::system("analyze"),
            ChatMessage::user("hello"),
        ])
        .with_sampling(SamplingParams {
            temperature: 0.4,
            max_tokens: 256,
        })
        .with_grammar(serde_json::json!({"type": "object"}));

        let api_request = provider.build_api_request(&request);
        assert_eq!(api_request.model, "llama3.2");
        assert!(!api_request.stream);
        assert_eq!(api_request.messages.len(), 2);
        assert_eq!(api_request.messages[0].role, "system");
        assert!((api_request.options.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(api_request.options.num_predict, 256);
        assert_eq!(
            api_request.format,
            Some(serde_json::json!({"type": "object"}))
        );
    }

    #[test]
    fn test_api_request_omits_absent_format() {
        let provider = OllamaProvider::new(test_config());
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        let api_request = provider.build_api_request(&request);
        let json = serde_json::to_value(&api_request).unwrap();
        assert!(json.get("format").is_none());
    }
}
