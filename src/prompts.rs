//! Facet Prompts
//!
//! Base system prompts for the four analysis facets and the shared user
//! message builder. Each prompt describes the exact JSON contract that the
//! facet's grammar enforces at decode time; keeping the textual contract and
//! the grammar in agreement gives weaker models two reinforcing signals.
//!
//! Retry-time corrective notes are NOT built here; they live with the retry
//! controller as a mapping from failure variant to text.

use draft_lens_core::AnalysisFacet;

const INTENT_SYSTEM_PROMPT: &str = r#"You are a communication analyst. Identify what the sender of the given message is trying to accomplish.

Respond with ONLY valid JSON matching this schema:
{
  "primary": "the dominant intent as a short phrase",
  "secondary": ["other detectable intents, strongest first"],
  "confidence": 0.0-1.0
}

No markdown fences, no explanatory text. Just the raw JSON object."#;

const TONE_SYSTEM_PROMPT: &str = r#"You are a communication analyst. Describe how the given message sounds to a reader.

Respond with ONLY valid JSON matching this schema:
{
  "overall_sentiment": -1.0 (negative) to 1.0 (positive),
  "emotions": [{"label": "emotion name", "intensity": 0.0-1.0}],
  "register": "formal" | "neutral" | "casual"
}

List emotions strongest first. No markdown fences, no explanatory text. Just the raw JSON object."#;

const IMPACT_SYSTEM_PROMPT: &str = r#"You are a communication analyst. Assess how the given message is likely to land on its recipient.

Respond with ONLY valid JSON matching this schema:
{
  "urgency": "low" | "medium" | "high",
  "pressure": "low" | "medium" | "high",
  "clarity": "low" | "medium" | "high",
  "summary": "one sentence describing the likely reception"
}

No markdown fences, no explanatory text. Just the raw JSON object."#;

const ALTERNATIVES_SYSTEM_PROMPT: &str = r#"You are a communication coach. Rewrite the given message in alternative phrasings that keep its meaning but change how it lands.

Respond with ONLY valid JSON matching this schema:
{
  "variants": [{"text": "the full rewritten message", "tags": ["short descriptive tags like 'softer' or 'more direct'"]}]
}

Order variants from most to least recommended. No markdown fences, no explanatory text. Just the raw JSON object."#;

/// The base system prompt for a facet's first attempt.
pub fn system_prompt(facet: AnalysisFacet) -> &'static str {
    match facet {
        AnalysisFacet::Intent => INTENT_SYSTEM_PROMPT,
        AnalysisFacet::Tone => TONE_SYSTEM_PROMPT,
        AnalysisFacet::Impact => IMPACT_SYSTEM_PROMPT,
        AnalysisFacet::Alternatives => ALTERNATIVES_SYSTEM_PROMPT,
    }
}

/// Build the user message for one generation call.
///
/// The prior-context blob arrives already formatted from the session layer;
/// it is passed through opaquely and simply omitted when absent.
pub fn build_user_message(message: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.trim().is_empty() => format!(
            "Earlier turns of this conversation, for context:\n{}\n\nAnalyze this drafted message:\n{}",
            context, message
        ),
        _ => format!("Analyze this drafted message:\n{}", message),
    }
}
