//! Draft Lens - Message Analysis Engine
//!
//! Turns an unreliable local language model into a source of structured,
//! schema-valid, complete analysis results for a single drafted message,
//! across four independent facets (intent, tone, impact, and alternative
//! phrasings) issued concurrently and assembled into one response.
//!
//! The pipeline per facet: constrained decoding against a registry-derived
//! grammar, layered validation (schema conformance, recursive truncation
//! detection), semantic normalization, and a fixed two-attempt retry loop
//! with failure-specific prompt augmentation. A batch succeeds only when
//! all four facets do.
//!
//! Transport routing, session storage, request logging, and presentation
//! are the caller's concern; the engine's surface is
//! [`AnalysisEngine::analyze_batch`].

mod batch;
pub mod config;
pub mod engine;
pub mod generation;
pub mod normalize;
pub mod prompts;
pub mod schema;
pub mod truncation;

// Re-export the engine surface
pub use config::EngineConfig;
pub use engine::AnalysisEngine;

// Re-export the shared data model and error taxonomy
pub use draft_lens_core::{
    AlternativeSet, AnalysisFacet, BatchFailed, BatchResult, Emotion, FacetError, FacetOutcome,
    GenerationRequest, ImpactAnalysis, IntentAnalysis, Level, ParsedResult, Register,
    SamplingParams, SchemaViolationKind, ToneAnalysis, ValidationFailure, ValidationOutcome,
    Variant,
};

// Re-export the model layer for callers that inject their own provider
pub use draft_lens_llm as llm;
