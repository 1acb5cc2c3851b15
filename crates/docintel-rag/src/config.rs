//! Configuration for retrieval and answer generation

use docintel_domain::{ConfidenceThresholds, ConfidenceWeights};
use serde::{Deserialize, Serialize};

/// Configuration for chunking, retrieval and answer generation
///
/// Every field has a default, so partial TOML documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Soft chunk budget in words
    pub chunk_size: usize,

    /// Words carried from the end of one chunk into the next
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    pub top_k: usize,

    /// Sampling temperature for answer generation
    pub temperature: f32,

    /// Token budget for answer generation
    pub max_tokens: u32,

    /// Characters of the top chunk quoted as source text
    pub source_preview_chars: usize,

    /// Confidence band thresholds
    pub thresholds: ConfidenceThresholds,

    /// Confidence signal weights
    pub weights: ConfidenceWeights,
}

impl RagConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err("chunk_overlap must be smaller than chunk_size".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.source_preview_chars == 0 {
            return Err("source_preview_chars must be greater than 0".to_string());
        }

        let t = &self.thresholds;
        if !(0.0 <= t.low && t.low <= t.medium && t.medium <= t.high && t.high <= 1.0) {
            return Err("thresholds must satisfy 0 <= low <= medium <= high <= 1".to_string());
        }

        let w = &self.weights;
        if [w.similarity, w.coverage, w.agreement]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err("weights must be finite and non-negative".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::chunking::DEFAULT_CHUNK_SIZE,
            chunk_overlap: crate::chunking::DEFAULT_CHUNK_OVERLAP,
            top_k: crate::retriever::DEFAULT_TOP_K,
            temperature: 0.1,
            max_tokens: 1024,
            source_preview_chars: 500,
            thresholds: ConfidenceThresholds::default(),
            weights: ConfidenceWeights::default(),
        }
    }
}
