//! Core Types
//!
//! Data model shared across the Draft Lens workspace: the analysis facets,
//! generation requests, per-facet result payloads, and the batch result map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationFailure;

/// The four independent analysis facets computed per message.
///
/// The set is fixed at compile time; each facet selects its own schema,
/// grammar, prompt template, and normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFacet {
    Intent,
    Tone,
    Impact,
    Alternatives,
}

impl AnalysisFacet {
    /// All facets, in the order a batch issues them.
    pub const ALL: [AnalysisFacet; 4] = [
        AnalysisFacet::Intent,
        AnalysisFacet::Tone,
        AnalysisFacet::Impact,
        AnalysisFacet::Alternatives,
    ];

    /// Stable lowercase name, used in logs and error reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisFacet::Intent => "intent",
            AnalysisFacet::Tone => "tone",
            AnalysisFacet::Impact => "impact",
            AnalysisFacet::Alternatives => "alternatives",
        }
    }
}

impl std::fmt::Display for AnalysisFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Temperature (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// An immutable request for one facet's analysis of one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The drafted message under analysis.
    pub message: String,
    /// Optional already-formatted prior-turns blob. Treated as opaque prompt
    /// content; analysis proceeds normally without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Which analysis to produce.
    pub facet: AnalysisFacet,
    /// Sampling parameters for the underlying model call.
    #[serde(default)]
    pub sampling: SamplingParams,
    /// Owning session identifier. Carried for log correlation only; it has
    /// no effect on generation.
    pub session_id: String,
}

impl GenerationRequest {
    /// Create a request with default sampling and a local session id.
    pub fn new(facet: AnalysisFacet, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            facet,
            sampling: SamplingParams::default(),
            session_id: "local".to_string(),
        }
    }

    /// Attach a prior-context blob.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Override the sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the owning session identifier.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

/// Severity-style level used by the impact facet.
///
/// Out-of-vocabulary values produced by the model are coerced by the
/// normalizer before this type is ever constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Speech register reported by the tone facet. Coercible like `Level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    Formal,
    Neutral,
    Casual,
}

impl Register {
    pub fn as_str(&self) -> &'static str {
        match self {
            Register::Formal => "formal",
            Register::Neutral => "neutral",
            Register::Casual => "casual",
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the sender is trying to accomplish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// The dominant intent, as a short phrase.
    pub primary: String,
    /// Secondary intents, strongest first.
    #[serde(default)]
    pub secondary: Vec<String>,
    /// Model confidence in the primary intent (0.0 - 1.0).
    pub confidence: f64,
}

/// One emotion detected in the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    /// Emotion label, e.g. "frustration".
    pub label: String,
    /// Strength of the signal (0.0 - 1.0).
    pub intensity: f64,
}

/// How the message sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAnalysis {
    /// Overall sentiment, -1.0 (negative) to 1.0 (positive).
    pub overall_sentiment: f64,
    /// Detected emotions, strongest first.
    pub emotions: Vec<Emotion>,
    /// Speech register of the message.
    pub register: Register,
}

/// How the message is likely to land on the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    /// How urgent the message reads.
    pub urgency: Level,
    /// How much pressure it puts on the recipient.
    pub pressure: Level,
    /// How unambiguous the ask is.
    pub clarity: Level,
    /// One-sentence description of the likely reception.
    pub summary: String,
}

/// One rewritten variant of the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// The full rewritten message.
    pub text: String,
    /// Descriptive tags, e.g. "softer", "more direct".
    pub tags: Vec<String>,
}

/// Alternative phrasings of the message, ordered by preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSet {
    /// Never empty once validated.
    pub variants: Vec<Variant>,
}

/// A structurally typed, validated, normalized analysis result.
///
/// Once constructed it is final and immutable; nothing downstream mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "facet", rename_all = "snake_case")]
pub enum ParsedResult {
    Intent(IntentAnalysis),
    Tone(ToneAnalysis),
    Impact(ImpactAnalysis),
    Alternatives(AlternativeSet),
}

impl ParsedResult {
    /// The facet this result belongs to.
    pub fn facet(&self) -> AnalysisFacet {
        match self {
            ParsedResult::Intent(_) => AnalysisFacet::Intent,
            ParsedResult::Tone(_) => AnalysisFacet::Tone,
            ParsedResult::Impact(_) => AnalysisFacet::Impact,
            ParsedResult::Alternatives(_) => AnalysisFacet::Alternatives,
        }
    }

    /// Decode a validated, normalized JSON value into the facet's payload.
    pub fn from_value(
        facet: AnalysisFacet,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match facet {
            AnalysisFacet::Intent => ParsedResult::Intent(serde_json::from_value(value)?),
            AnalysisFacet::Tone => ParsedResult::Tone(serde_json::from_value(value)?),
            AnalysisFacet::Impact => ParsedResult::Impact(serde_json::from_value(value)?),
            AnalysisFacet::Alternatives => {
                ParsedResult::Alternatives(serde_json::from_value(value)?)
            }
        })
    }
}

/// Outcome of one generation attempt after the full validation stack.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// Parsed, validated, truncation-free, normalized.
    Valid(ParsedResult),
    /// Failed one of the validation layers; carries the precise reason.
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

/// Observational record of one generation attempt.
///
/// Owned by the retry controller for the duration of one facet's generation
/// and discarded after logging.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// 1 or 2.
    pub attempt: u8,
    /// The full system prompt used for this attempt.
    pub prompt: String,
    /// Raw model output, if the call produced any.
    pub raw_output: Option<String>,
    /// Why the attempt failed, or None on success.
    pub failure: Option<ValidationFailure>,
}

/// A facet's final result plus how many attempts it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetOutcome {
    pub result: ParsedResult,
    /// 1 if the first attempt succeeded, 2 if the retry did.
    pub attempts: u8,
}

/// Mapping from facet to its final result.
///
/// Created empty per request, populated as each facet's pipeline resolves,
/// and handed to the caller only once all four facets have succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    outcomes: HashMap<AnalysisFacet, FacetOutcome>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one facet's outcome. Later inserts for the same facet replace
    /// earlier ones; the orchestrator never produces duplicates.
    pub fn insert(&mut self, outcome: FacetOutcome) {
        self.outcomes.insert(outcome.result.facet(), outcome);
    }

    pub fn get(&self, facet: AnalysisFacet) -> Option<&FacetOutcome> {
        self.outcomes.get(&facet)
    }

    /// True once every facet has a result.
    pub fn is_complete(&self) -> bool {
        AnalysisFacet::ALL
            .iter()
            .all(|f| self.outcomes.contains_key(f))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnalysisFacet, &FacetOutcome)> {
        self.outcomes.iter()
    }
}
