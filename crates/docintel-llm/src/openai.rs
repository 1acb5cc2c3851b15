//! OpenAI-compatible chat completions provider
//!
//! Works against any server exposing `POST {base}/chat/completions` with
//! bearer authentication. Defaults to Groq's hosted endpoint.

use crate::retry::{Attempt, RetryPolicy};
use crate::LlmError;
use docintel_domain::traits::{CompletionRequest, LlmProvider};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL (Groq)
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default timeout for requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

/// OpenAI-compatible completion provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
    retry: RetryPolicy,
}

impl OpenAiProvider {
    /// Create a provider for `model` at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Configuration`] if the key is empty or the HTTP
    /// client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a Groq provider with the default model
    pub fn groq(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL, api_key)
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

    fn send(&self, url: &str, body: &ChatCompletionRequest<'_>) -> Result<String, Attempt> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| {
                Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                let parsed: ChatCompletionResponse = response.json().map_err(|e| {
                    Attempt::Fatal(LlmError::InvalidResponse(format!(
                        "Failed to parse response: {}",
                        e
                    )))
                })?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| {
                        Attempt::Fatal(LlmError::InvalidResponse(
                            "Response has no choices".to_string(),
                        ))
                    })
            }
            StatusCode::NOT_FOUND => Err(Attempt::Fatal(LlmError::ModelNotAvailable(
                self.model.clone(),
            ))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Attempt::Fatal(
                LlmError::Configuration(format!("HTTP {}: check the API key", status)),
            )),
            StatusCode::TOO_MANY_REQUESTS => Err(Attempt::Retry(LlmError::RateLimitExceeded)),
            _ => {
                let error_text = response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(Attempt::Retry(LlmError::Communication(format!(
                    "HTTP {}: {}",
                    status, error_text
                ))))
            }
        }
    }
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system_prompt,
                },
                Message {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Calling {} with model {}", url, self.model);
        self.retry.run(|| self.send(&url, &body))
    }
}
