//! Engine Configuration
//!
//! Process-wide, immutable once the engine is constructed. The engine does
//! no file I/O for configuration; callers build or deserialize this and
//! hand it over.

use serde::{Deserialize, Serialize};

use draft_lens_core::{AnalysisFacet, SamplingParams};

/// Configuration for an `AnalysisEngine`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model name served by the local Ollama instance.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL override for the Ollama server (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Temperature for the three judgment facets (0.0 - 1.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Temperature for the alternatives facet, which benefits from more
    /// varied phrasing.
    #[serde(default = "default_creative_temperature")]
    pub creative_temperature: f32,
    /// Token cap for the judgment facets.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token cap for the alternatives facet; rewrites need more room.
    #[serde(default = "default_alternatives_max_tokens")]
    pub alternatives_max_tokens: u32,
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_creative_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

fn default_alternatives_max_tokens() -> u32 {
    768
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            creative_temperature: default_creative_temperature(),
            max_tokens: default_max_tokens(),
            alternatives_max_tokens: default_alternatives_max_tokens(),
        }
    }
}

impl EngineConfig {
    /// Sampling parameters for one facet's generation calls.
    pub fn sampling_for(&self, facet: AnalysisFacet) -> SamplingParams {
        match facet {
            AnalysisFacet::Alternatives => SamplingParams {
                temperature: self.creative_temperature,
                max_tokens: self.alternatives_max_tokens,
            },
            _ => SamplingParams {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
        }
    }
}
