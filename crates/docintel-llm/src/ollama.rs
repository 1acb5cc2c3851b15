//! Ollama Provider Implementation
//!
//! Provides chat completion and embeddings through a local Ollama instance.
//!
//! # Features
//!
//! - Blocking HTTP communication with the Ollama API
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use docintel_domain::traits::{CompletionRequest, LlmProvider};
//! use docintel_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! let answer = provider
//!     .complete(&CompletionRequest::new("Be brief.", "Say hello"))
//!     .unwrap();
//! println!("{}", answer);
//! ```

use crate::retry::{Attempt, RetryPolicy};
use crate::LlmError;
use docintel_domain::traits::{CompletionRequest, EmbeddingModel, LlmProvider};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

/// Request body for the Ollama embeddings API
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from the Ollama embeddings API
#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

fn build_client() -> Result<Client, LlmError> {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// POST a JSON body and decode a JSON reply, classifying failures for retry
fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
    client: &Client,
    url: &str,
    body: &B,
    model: &str,
) -> Result<R, Attempt> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e))))?;

    let status = response.status();
    if status.is_success() {
        return response.json::<R>().map_err(|e| {
            Attempt::Fatal(LlmError::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(Attempt::Fatal(LlmError::ModelNotAvailable(model.to_string())));
    }

    let error_text = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(Attempt::Retry(LlmError::Communication(format!(
        "HTTP {}: {}",
        status, error_text
    ))))
}

/// Ollama chat provider for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: Client,
    retry: RetryPolicy,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client()?,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.base_delay = delay;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response: ChatResponse = self
            .retry
            .run(|| post_json(&self.client, &url, &body, &self.model))?;
        Ok(response.message.content)
    }
}

/// Ollama embeddings client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    client: Client,
    retry: RetryPolicy,
}

impl OllamaEmbedder {
    /// Create a new embeddings client
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client()?,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }
}

impl EmbeddingModel for OllamaEmbedder {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let body = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response: EmbeddingResponse = self
            .retry
            .run(|| post_json(&self.client, &url, &body, &self.model))?;

        if response.embedding.is_empty() {
            return Err(LlmError::InvalidResponse("Empty embedding".to_string()));
        }
        Ok(response.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model(), "llama3");
        assert_eq!(provider.retry.max_retries, crate::retry::DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_ollama_provider_with_max_retries() {
        let provider = OllamaProvider::default_endpoint("llama3")
            .unwrap()
            .with_max_retries(5);
        assert_eq!(provider.retry.max_retries, 5);
    }

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequest {
            model: "llama3",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
            options: ChatOptions {
                temperature: 0.1,
                num_predict: 1024,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_ollama_error_handling() {
        // Invalid port triggers a request error
        let provider = OllamaProvider::new("http://localhost:99999", "llama3")
            .unwrap()
            .with_max_retries(1);

        let result = provider.complete(&CompletionRequest::new("sys", "test"));
        match result {
            Err(LlmError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[test]
    fn test_embedder_error_handling() {
        let embedder = OllamaEmbedder::new("http://localhost:99999", DEFAULT_EMBEDDING_MODEL)
            .unwrap()
            .with_max_retries(1);
        assert!(matches!(
            embedder.embed("text"),
            Err(LlmError::Communication(_))
        ));
    }

    #[test]
    #[ignore] // Only run when Ollama is available
    fn test_ollama_complete_integration() {
        let provider = OllamaProvider::default_endpoint("llama3").unwrap();
        let result = provider.complete(&CompletionRequest::new(
            "Answer in one word.",
            "Say 'hello' and nothing else",
        ));
        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
