//! Constrained Generator
//!
//! Executes one model call under the facet's grammar and runs the full
//! validation stack over the output. The layering is deliberate: the
//! cheapest, most specific check (parsing the constrained output) runs
//! first; softer semantic checks (truncation, normalization) run last, so a
//! failure is always diagnosed with the most precise reason available.
//!
//! Parse → validate → recursive truncation check → normalize. Only a value
//! that clears all of it becomes `Valid`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use draft_lens_core::{
    GenerationRequest, ParsedResult, SchemaViolationKind, ValidationFailure, ValidationOutcome,
};
use draft_lens_llm::{ChatMessage, ChatRequest, LlmResult, ModelProvider};

use crate::normalize;
use crate::prompts;
use crate::schema::SchemaRegistry;

/// One attempt's outcome plus the raw text that produced it, kept only so
/// the retry controller can log it.
#[derive(Debug)]
pub struct GenerationAttempt {
    pub outcome: ValidationOutcome,
    pub raw_output: Option<String>,
}

/// Runs single generation calls for any facet.
pub struct ConstrainedGenerator {
    provider: Arc<dyn ModelProvider>,
    registry: Arc<SchemaRegistry>,
}

impl ConstrainedGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, registry: Arc<SchemaRegistry>) -> Self {
        Self { provider, registry }
    }

    /// Run one constrained generation call and validate the result.
    ///
    /// Transport failures surface as `Err`; everything the model itself got
    /// wrong comes back as `Ok` with an `Invalid` outcome so the retry
    /// controller can react to the precise reason.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        system_prompt: &str,
    ) -> LlmResult<GenerationAttempt> {
        let facet = request.facet;
        let user_message = prompts::build_user_message(&request.message, request.context.as_deref());

        let chat = ChatRequest::new(vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_message),
        ])
        .with_sampling(request.sampling)
        .with_grammar(self.registry.grammar_for(facet));

        let response = self.provider.complete(chat).await?;
        let raw = response.content;

        debug!(
            facet = %facet,
            session = %request.session_id,
            len = raw.len(),
            "generator: received model output"
        );

        let Some(mut value) = parse_output(&raw) else {
            let detail = if raw.trim().is_empty() {
                "model returned an empty response".to_string()
            } else {
                "output was not valid JSON after strict and lenient parsing".to_string()
            };
            return Ok(GenerationAttempt {
                outcome: ValidationOutcome::Invalid(ValidationFailure::Unparseable { detail }),
                raw_output: Some(raw),
            });
        };

        let schema = self.registry.schema_for(facet);

        if let Err(failure) = schema.validate(&value) {
            return Ok(GenerationAttempt {
                outcome: ValidationOutcome::Invalid(failure),
                raw_output: Some(raw),
            });
        }

        if let Some(path) = crate::truncation::find_truncated_leaf(&value) {
            return Ok(GenerationAttempt {
                outcome: ValidationOutcome::Invalid(ValidationFailure::Truncation { path }),
                raw_output: Some(raw),
            });
        }

        normalize::normalize(schema, &mut value);

        let outcome = match ParsedResult::from_value(facet, value) {
            Ok(parsed) => ValidationOutcome::Valid(parsed),
            Err(e) => ValidationOutcome::Invalid(ValidationFailure::SchemaViolation {
                violation: SchemaViolationKind::TypeMismatch,
                path: "$".to_string(),
                detail: format!("normalized value did not decode as {}: {}", facet, e),
            }),
        };

        Ok(GenerationAttempt {
            outcome,
            raw_output: Some(raw),
        })
    }
}

/// Strict parse of the constrained output, then one lenient fallback parse
/// over the raw text. Returns None when neither yields JSON.
fn parse_output(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "generator: strict parse failed, trying lenient fallback");
            let candidate = extract_json_candidate(trimmed);
            serde_json::from_str::<Value>(&candidate).ok()
        }
    }
}

/// Extract a JSON object from model text, tolerating markdown fences and
/// surrounding prose.
fn extract_json_candidate(text: &str) -> String {
    let trimmed = text.trim();

    // Try markdown code fences
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let content_start = after_fence.find('\n').map(|nl| nl + 1).unwrap_or(0);
        let content = &after_fence[content_start..];
        if let Some(end) = content.find("```") {
            return content[..end].trim().to_string();
        }
    }

    // Try the first { and last } for a JSON object
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start <= end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}
