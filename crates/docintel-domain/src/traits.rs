//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the
//! capabilities it consumes: text embedding, language-model completion and
//! durable blob storage. Implementations live in other crates.

use std::sync::Arc;

/// Default sampling temperature for completions
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default completion length budget in tokens
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A single-turn, non-streaming completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions for the model
    pub system_prompt: String,
    /// The user turn
    pub user_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with default sampling parameters
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (docintel-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Run a single completion and return the generated text
    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error>;
}

/// Trait for text embedding models
///
/// The same model must be used for chunks at ingestion and for queries at
/// retrieval time.
pub trait EmbeddingModel {
    /// Error type for embedding operations
    type Error;

    /// Map text to a fixed-dimension vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;
}

/// Trait for durable key/value blob storage
///
/// Implemented by the storage layer (docintel-store)
pub trait BlobStore {
    /// Error type for blob operations
    type Error;

    /// Write (or overwrite) a blob
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read a blob, `None` if the key does not exist
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// List every stored key
    fn keys(&self) -> Result<Vec<String>, Self::Error>;
}

impl<T: LlmProvider + ?Sized> LlmProvider for Arc<T> {
    type Error = T::Error;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        (**self).complete(request)
    }
}

impl<T: EmbeddingModel + ?Sized> EmbeddingModel for Arc<T> {
    type Error = T::Error;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        (**self).embed(text)
    }
}
