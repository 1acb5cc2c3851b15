//! Error types for the Extractor
//!
//! Every variant is recovered inside the crate: a failed strategy hands
//! over to the next one and the rule cascade never fails.

use thiserror::Error;

/// Errors that can occur during a single extraction attempt
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// No JSON object could be located in the model output
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The strategy produced no populated field
    #[error("Extraction produced no fields")]
    EmptyResult,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
