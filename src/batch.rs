//! Batch Orchestrator
//!
//! Fans the four facet pipelines out as independent tokio tasks, one
//! execution channel each against the shared provider, and joins them all
//! before deciding the batch's fate. The join is pure: no facet observes
//! another's in-flight or final state, and completion order is irrelevant.
//!
//! All four succeed → an assembled `BatchResult`. Any facet fails → the
//! whole batch fails with every failed facet's terminal reason, and the
//! surviving facets' results are discarded. In-flight generations are never
//! force-aborted; the join simply waits for their natural completion.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;

use draft_lens_core::{BatchFailed, BatchResult, FacetError, GenerationRequest};
use draft_lens_llm::ModelProvider;

use crate::generation::{ConstrainedGenerator, RetryController};
use crate::schema::SchemaRegistry;

/// Run one request per facet concurrently and assemble the batch.
pub(crate) async fn run_batch(
    provider: Arc<dyn ModelProvider>,
    registry: Arc<SchemaRegistry>,
    requests: Vec<GenerationRequest>,
) -> Result<BatchResult, BatchFailed> {
    let mut facets = Vec::with_capacity(requests.len());
    let mut handles = Vec::with_capacity(requests.len());

    for request in requests {
        facets.push(request.facet);
        // Each task exclusively owns its controller and attempt history;
        // the provider and registry are shared read-only.
        let controller = RetryController::new(ConstrainedGenerator::new(
            provider.clone(),
            registry.clone(),
        ));
        handles.push(tokio::spawn(
            async move { controller.run(&request).await },
        ));
    }

    let joined = join_all(handles).await;

    let mut batch = BatchResult::new();
    let mut failures = Vec::new();

    for (facet, joined_result) in facets.into_iter().zip(joined) {
        match joined_result {
            Ok(Ok(outcome)) => {
                debug!(facet = %facet, attempts = outcome.attempts, "batch: facet resolved");
                batch.insert(outcome);
            }
            Ok(Err(facet_error)) => {
                debug!(facet = %facet, error = %facet_error, "batch: facet failed");
                failures.push(facet_error);
            }
            Err(join_error) => {
                failures.push(FacetError::Transport {
                    facet,
                    detail: format!("facet task failed: {}", join_error),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(batch)
    } else {
        Err(BatchFailed::new(failures))
    }
}
