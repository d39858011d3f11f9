//! Scripted provider for pipeline tests.
//!
//! Serves canned replies per facet (recovered from the system prompt each
//! request was built with) and records every call for assertions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use draft_lens::llm::{ChatRequest, CompletionResponse, LlmError, LlmResult, ModelProvider};
use draft_lens::{prompts, AnalysisFacet};

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub facet: AnalysisFacet,
    pub system_prompt: String,
    pub user_message: String,
}

pub struct ScriptedProvider {
    scripts: Mutex<HashMap<AnalysisFacet, Vec<String>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<SeenCall>>,
}

impl ScriptedProvider {
    pub fn new(scripts: &[(AnalysisFacet, &[&str])]) -> Self {
        let map = scripts
            .iter()
            .map(|(facet, replies)| {
                (
                    *facet,
                    replies.iter().rev().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self {
            scripts: Mutex::new(map),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Recorded calls for one facet, in order.
    pub fn calls_for(&self, facet: AnalysisFacet) -> Vec<SeenCall> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.facet == facet)
            .cloned()
            .collect()
    }

    fn facet_of(request: &ChatRequest) -> AnalysisFacet {
        let system = request.system_content().unwrap_or_default();
        AnalysisFacet::ALL
            .into_iter()
            .find(|&facet| system.starts_with(prompts::system_prompt(facet)))
            .expect("request built from a known facet prompt")
    }

    fn user_message_of(request: &ChatRequest) -> String {
        request
            .messages
            .iter()
            .find(|m| m.role == draft_lens::llm::MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: ChatRequest) -> LlmResult<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let facet = Self::facet_of(&request);
        self.seen.lock().unwrap().push(SeenCall {
            facet,
            system_prompt: request.system_content().unwrap_or_default().to_string(),
            user_message: Self::user_message_of(&request),
        });

        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&facet)
            .and_then(|replies| replies.pop())
            .ok_or_else(|| LlmError::Other {
                message: format!("no scripted reply left for {}", facet),
            })?;

        Ok(CompletionResponse {
            content: reply,
            model: "scripted-model".to_string(),
            usage: Default::default(),
        })
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Canned payloads
// ---------------------------------------------------------------------------

pub const VALID_INTENT: &str =
    r#"{"primary": "request the document", "secondary": ["set expectations"], "confidence": 0.86}"#;

pub const VALID_TONE: &str = r#"{"overall_sentiment": 0.1, "emotions": [{"label": "hope", "intensity": 0.4}], "register": "neutral"}"#;

pub const VALID_IMPACT: &str = r#"{"urgency": "medium", "pressure": "low", "clarity": "high", "summary": "Reads as a polite, clear request."}"#;

pub const VALID_ALTERNATIVES: &str = r#"{"variants": [{"text": "Could you send the document when you get a chance?", "tags": ["softer"]}, {"text": "Please send the document today.", "tags": ["more direct"]}]}"#;

/// Every facet answered cleanly on attempt 1.
pub fn all_valid() -> ScriptedProvider {
    ScriptedProvider::new(&[
        (AnalysisFacet::Intent, &[VALID_INTENT]),
        (AnalysisFacet::Tone, &[VALID_TONE]),
        (AnalysisFacet::Impact, &[VALID_IMPACT]),
        (AnalysisFacet::Alternatives, &[VALID_ALTERNATIVES]),
    ])
}
