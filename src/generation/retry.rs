//! Retry Controller
//!
//! Bounded retry around the constrained generator: exactly two attempts per
//! facet, fixed. A model that fails twice on the same facet is hitting
//! capability or prompt-ambiguity limits that identical-style retries will
//! not resolve, and the fixed bound caps worst-case batch latency.
//!
//! Attempt 2 does not say "try again": its prompt is the base prompt plus a
//! corrective note derived from the exact failure variant, so the mapping is
//! exhaustively testable instead of string-matching on error messages.

use draft_lens_core::{
    AttemptRecord, FacetError, FacetOutcome, GenerationRequest, SchemaViolationKind,
    ValidationFailure, ValidationOutcome,
};
use tracing::debug;

use super::generator::ConstrainedGenerator;
use crate::prompts;

/// Hard attempt cap per facet. Not configurable at runtime.
pub const MAX_ATTEMPTS: u8 = 2;

/// Drives one facet's generation to success or exhaustion.
pub struct RetryController {
    generator: ConstrainedGenerator,
}

impl RetryController {
    pub fn new(generator: ConstrainedGenerator) -> Self {
        Self { generator }
    }

    /// Run the facet's pipeline: attempt 1 with the base prompt, and on
    /// failure attempt 2 with the failure-specific augmented prompt.
    ///
    /// Transport errors abort immediately; prompt augmentation cannot fix
    /// an unreachable server.
    pub async fn run(&self, request: &GenerationRequest) -> Result<FacetOutcome, FacetError> {
        let facet = request.facet;
        let base_prompt = prompts::system_prompt(facet);

        let first = self
            .generator
            .generate(request, base_prompt)
            .await
            .map_err(|e| FacetError::Transport {
                facet,
                detail: e.to_string(),
            })?;

        let first_failure = match first.outcome {
            ValidationOutcome::Valid(result) => {
                log_attempt(request, &AttemptRecord {
                    attempt: 1,
                    prompt: base_prompt.to_string(),
                    raw_output: first.raw_output,
                    failure: None,
                });
                return Ok(FacetOutcome { result, attempts: 1 });
            }
            ValidationOutcome::Invalid(failure) => failure,
        };

        log_attempt(request, &AttemptRecord {
            attempt: 1,
            prompt: base_prompt.to_string(),
            raw_output: first.raw_output,
            failure: Some(first_failure.clone()),
        });

        let augmented_prompt = augment_prompt(base_prompt, &first_failure);
        let second = self
            .generator
            .generate(request, &augmented_prompt)
            .await
            .map_err(|e| FacetError::Transport {
                facet,
                detail: e.to_string(),
            })?;

        match second.outcome {
            ValidationOutcome::Valid(result) => {
                log_attempt(request, &AttemptRecord {
                    attempt: 2,
                    prompt: augmented_prompt,
                    raw_output: second.raw_output,
                    failure: None,
                });
                Ok(FacetOutcome { result, attempts: 2 })
            }
            ValidationOutcome::Invalid(second_failure) => {
                log_attempt(request, &AttemptRecord {
                    attempt: 2,
                    prompt: augmented_prompt,
                    raw_output: second.raw_output,
                    failure: Some(second_failure.clone()),
                });
                Err(FacetError::Exhausted {
                    facet,
                    failures: vec![first_failure, second_failure],
                })
            }
        }
    }
}

/// Build the attempt-2 system prompt from the attempt-1 failure.
pub fn augment_prompt(base_prompt: &str, failure: &ValidationFailure) -> String {
    format!(
        "{}\n\nIMPORTANT: your previous answer was rejected because {}",
        base_prompt,
        corrective_note(failure)
    )
}

/// Failure-specific corrective text. Exhaustive over the closed failure set;
/// no variant gets a generic "try again".
pub fn corrective_note(failure: &ValidationFailure) -> String {
    match failure {
        ValidationFailure::SchemaViolation {
            violation,
            path,
            detail,
        } => match violation {
            SchemaViolationKind::TooShort | SchemaViolationKind::TooFew => format!(
                "it left '{}' empty. Fill every string field with real content and give every \
                 list at least one item; never leave a field blank.",
                path
            ),
            SchemaViolationKind::MissingField => format!(
                "it omitted the required field '{}'. Include every field the format requires, \
                 even when unsure.",
                path
            ),
            SchemaViolationKind::EnumMismatch => format!(
                "the value at '{}' was not one of the allowed options ({}). Choose only from \
                 the allowed values.",
                path, detail
            ),
            SchemaViolationKind::TypeMismatch | SchemaViolationKind::OutOfRange => format!(
                "the value at '{}' had the wrong type or range ({}). Match the declared type \
                 and range of every field exactly.",
                path, detail
            ),
        },
        ValidationFailure::Truncation { path } => format!(
            "it was cut off mid-sentence near '{}'. Keep the answer short enough to finish: \
             complete every sentence and close every bracket before stopping.",
            path
        ),
        ValidationFailure::Unparseable { .. } => "it was not parseable JSON. Respond with \
             exactly one JSON object and nothing else: no prose, no code fences, no trailing \
             text."
            .to_string(),
    }
}

/// Log an attempt record, then let it drop. Records exist for observability
/// only; nothing reads them back.
fn log_attempt(request: &GenerationRequest, record: &AttemptRecord) {
    match &record.failure {
        None => debug!(
            facet = %request.facet,
            session = %request.session_id,
            attempt = record.attempt,
            "retry: attempt succeeded"
        ),
        Some(failure) => debug!(
            facet = %request.facet,
            session = %request.session_id,
            attempt = record.attempt,
            kind = failure.kind_str(),
            reason = %failure,
            raw_len = record.raw_output.as_deref().map(str::len).unwrap_or(0),
            "retry: attempt rejected"
        ),
    }
}
