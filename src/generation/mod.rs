//! Generation pipeline
//!
//! - `generator` - one constrained model call plus the validation stack
//! - `retry` - the fixed two-attempt loop with failure-specific prompting

pub mod generator;
pub mod retry;

pub use generator::{ConstrainedGenerator, GenerationAttempt};
pub use retry::{augment_prompt, corrective_note, RetryController, MAX_ATTEMPTS};
