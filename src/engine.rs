//! Analysis Engine
//!
//! The public entry point: one constructed-and-passed-around object owning
//! the provider, the schema registry, and the configuration. There is no
//! global state; callers create the engine at process start, pass it by
//! reference, and drop it at shutdown.

use std::sync::Arc;

use tracing::info;

use draft_lens_core::{AnalysisFacet, BatchFailed, BatchResult, GenerationRequest};
use draft_lens_llm::{LlmResult, ModelProvider, OllamaConfig, OllamaProvider};

use crate::batch;
use crate::config::EngineConfig;
use crate::schema::SchemaRegistry;

/// Four-facet message analysis over one shared model.
pub struct AnalysisEngine {
    provider: Arc<dyn ModelProvider>,
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
}

impl AnalysisEngine {
    /// Create an engine backed by a local Ollama server.
    pub fn new(config: EngineConfig) -> Self {
        let provider = Arc::new(OllamaProvider::new(OllamaConfig {
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }));
        Self::with_provider(config, provider)
    }

    /// Create an engine over any provider. This is the seam tests and
    /// alternative backends use.
    pub fn with_provider(config: EngineConfig, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            registry: Arc::new(SchemaRegistry::new()),
            config,
        }
    }

    /// Analyze one message across all four facets concurrently.
    ///
    /// `context` is an optional already-formatted prior-turns blob from the
    /// caller's session layer; it is passed through opaquely and analysis
    /// never blocks on its presence. Returns a complete four-facet result
    /// or a `BatchFailed` naming every facet that could not be resolved.
    pub async fn analyze_batch(
        &self,
        message: &str,
        context: Option<&str>,
    ) -> Result<BatchResult, BatchFailed> {
        self.analyze_batch_for_session(message, context, "local")
            .await
    }

    /// `analyze_batch` with an owning session identifier for log
    /// correlation. The identifier has no behavioral effect.
    pub async fn analyze_batch_for_session(
        &self,
        message: &str,
        context: Option<&str>,
        session_id: &str,
    ) -> Result<BatchResult, BatchFailed> {
        info!(
            session = %session_id,
            model = %self.provider.model(),
            has_context = context.is_some(),
            "engine: starting four-facet analysis batch"
        );

        let requests: Vec<GenerationRequest> = AnalysisFacet::ALL
            .iter()
            .map(|&facet| {
                let mut request = GenerationRequest::new(facet, message)
                    .with_sampling(self.config.sampling_for(facet))
                    .with_session(session_id);
                if let Some(context) = context {
                    request = request.with_context(context);
                }
                request
            })
            .collect();

        batch::run_batch(self.provider.clone(), self.registry.clone(), requests).await
    }

    /// Check that the underlying provider is reachable.
    pub async fn health_check(&self) -> LlmResult<()> {
        self.provider.health_check().await
    }

    /// The model this engine analyzes with.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
