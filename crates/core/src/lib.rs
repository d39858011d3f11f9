//! Draft Lens Core
//!
//! Data model and error taxonomy for the Draft Lens workspace. This crate
//! has no dependencies on the model layer or the engine; it only carries the
//! types both sides agree on.
//!
//! ## Module Organization
//!
//! - `types` - analysis facets, requests, per-facet payloads, batch results
//! - `error` - attempt/facet/batch failure taxonomy

pub mod error;
pub mod types;

// ── Error Taxonomy ─────────────────────────────────────────────────────
pub use error::{BatchFailed, FacetError, SchemaViolationKind, ValidationFailure};

// ── Data Model ─────────────────────────────────────────────────────────
pub use types::{
    AlternativeSet, AnalysisFacet, AttemptRecord, BatchResult, Emotion, FacetOutcome,
    GenerationRequest, ImpactAnalysis, IntentAnalysis, Level, ParsedResult, Register,
    SamplingParams, ToneAnalysis, ValidationOutcome, Variant,
};
