//! Docintel LLM Provider Layer
//!
//! Pluggable completion and embedding providers.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` and
//! `EmbeddingModel` traits from `docintel-domain`. All providers are
//! blocking: every pipeline operation is a synchronous procedure.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted provider for testing
//! - `OllamaProvider` / `OllamaEmbedder`: Local Ollama API integration
//! - `OpenAiProvider`: OpenAI-compatible chat completions (Groq by default)
//! - `AnyProvider`: Runtime selection between the above
//!
//! # Examples
//!
//! ```
//! use docintel_domain::traits::{CompletionRequest, LlmProvider};
//! use docintel_llm::MockProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete(&CompletionRequest::new("sys", "test prompt")).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;
pub mod retry;

use docintel_domain::traits::{CompletionRequest, LlmProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

pub use ollama::{OllamaEmbedder, OllamaProvider};
pub use openai::OpenAiProvider;
pub use retry::RetryPolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing key, bad client settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Scripted responses are selected by substring match against the user
/// prompt, in insertion order; the default response is used otherwise.
///
/// Clones share scripts, call counts and the recorded requests.
///
/// # Examples
///
/// ```
/// use docintel_domain::traits::{CompletionRequest, LlmProvider};
/// use docintel_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("QUESTION: who", "ABC Corp");
///
/// let request = CompletionRequest::new("sys", "CONTEXT: ...\n\nQUESTION: who shipped?");
/// assert_eq!(provider.complete(&request).unwrap(), "ABC Corp");
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: Scripted,
    scripts: Arc<Mutex<Vec<(String, Scripted)>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: Scripted::Reply(response.into()),
            scripts: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider whose every call fails
    pub fn failing() -> Self {
        Self {
            default_response: Scripted::Fail,
            ..Self::new("")
        }
    }

    /// Respond with `response` when the user prompt contains `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        self.scripts
            .lock()
            .push((pattern.into(), Scripted::Reply(response.into())));
    }

    /// Fail when the user prompt contains `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        self.scripts.lock().push((pattern.into(), Scripted::Fail));
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().last().cloned()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        self.requests.lock().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.requests.lock().push(request.clone());

        let scripted = self
            .scripts
            .lock()
            .iter()
            .find(|(pattern, _)| request.user_prompt.contains(pattern.as_str()))
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| self.default_response.clone());

        match scripted {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}

/// A completion provider chosen at runtime
#[derive(Debug, Clone)]
pub enum AnyProvider {
    /// Scripted mock
    Mock(MockProvider),
    /// Local Ollama
    Ollama(OllamaProvider),
    /// OpenAI-compatible endpoint
    OpenAi(OpenAiProvider),
}

impl LlmProvider for AnyProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        match self {
            AnyProvider::Mock(p) => p.complete(request),
            AnyProvider::Ollama(p) => p.complete(request),
            AnyProvider::OpenAi(p) => p.complete(request),
        }
    }
}
