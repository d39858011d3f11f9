//! Error Taxonomy
//!
//! Failure types for the analysis pipeline, layered by scope:
//!
//! - [`ValidationFailure`] is local to one generation attempt and drives the
//!   retry controller's prompt augmentation. It is a closed variant set so
//!   augmentation logic can match exhaustively instead of inspecting error
//!   message strings.
//! - [`FacetError`] is the terminal failure of one facet's pipeline.
//! - [`BatchFailed`] is the only error surfaced to callers; it names every
//!   failed facet and its terminal reasons. Partial batches are never
//!   returned.
//!
//! Normalization corrections (enum coercion, consistency repair) are not
//! errors anywhere in this taxonomy; they are logged repairs that still
//! yield a valid outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AnalysisFacet;

/// The specific schema rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaViolationKind {
    /// A required field is absent.
    MissingField,
    /// A field holds a value of the wrong JSON type.
    TypeMismatch,
    /// A strict enum field holds an undeclared value.
    EnumMismatch,
    /// A string is shorter than its declared minimum (empty, usually).
    TooShort,
    /// An array has fewer items than its declared minimum.
    TooFew,
    /// A number is outside its declared range.
    OutOfRange,
}

/// Why one generation attempt was rejected.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// The parsed value broke one or more schema rules. `kind` and `path`
    /// describe the first offender; `detail` lists all of them.
    #[error("schema violation at '{path}': {detail}")]
    SchemaViolation {
        violation: SchemaViolationKind,
        path: String,
        detail: String,
    },
    /// A string leaf looks cut off mid-generation.
    #[error("truncated output at '{path}'")]
    Truncation { path: String },
    /// Neither the strict nor the lenient parse produced JSON.
    #[error("unparseable output: {detail}")]
    Unparseable { detail: String },
}

impl ValidationFailure {
    /// Short stable tag for logs.
    pub fn kind_str(&self) -> &'static str {
        match self {
            ValidationFailure::SchemaViolation { .. } => "schema_violation",
            ValidationFailure::Truncation { .. } => "truncation",
            ValidationFailure::Unparseable { .. } => "unparseable",
        }
    }
}

/// Terminal failure of one facet's pipeline.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FacetError {
    /// Both attempts produced invalid output. Carries each attempt's reason
    /// in order.
    #[error("facet '{facet}' exhausted after {} attempts: {}", .failures.len(), describe_failures(.failures))]
    Exhausted {
        facet: AnalysisFacet,
        failures: Vec<ValidationFailure>,
    },
    /// The model call itself failed (connection, HTTP, task). Prompt
    /// augmentation cannot fix this, so the pipeline stops without a retry.
    #[error("facet '{facet}' model call failed: {detail}")]
    Transport {
        facet: AnalysisFacet,
        detail: String,
    },
}

impl FacetError {
    pub fn facet(&self) -> AnalysisFacet {
        match self {
            FacetError::Exhausted { facet, .. } => *facet,
            FacetError::Transport { facet, .. } => *facet,
        }
    }
}

fn describe_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(i, f)| format!("attempt {}: {}", i + 1, f))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The batch-level error surfaced to callers.
///
/// A batch fails as a whole when any facet fails; the surviving facets'
/// results are discarded rather than partially returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailed {
    pub failures: Vec<FacetError>,
}

impl BatchFailed {
    pub fn new(failures: Vec<FacetError>) -> Self {
        Self { failures }
    }

    /// The facets that failed, in pipeline order.
    pub fn failed_facets(&self) -> Vec<AnalysisFacet> {
        self.failures.iter().map(|f| f.facet()).collect()
    }
}

impl std::fmt::Display for BatchFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let details = self
            .failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "analysis batch failed: {}", details)
    }
}

impl std::error::Error for BatchFailed {}
