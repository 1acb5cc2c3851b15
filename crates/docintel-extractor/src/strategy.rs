//! Extraction strategies
//!
//! The model-backed strategy may fail or come back empty; the rule-based
//! strategy always yields a record.

use crate::clean::normalize;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::recover_object;
use crate::prompt::{PromptBuilder, EXTRACTION_SYSTEM_PROMPT};
use crate::rules;
use crate::types::{ExtractionMethod, ExtractionRecord};
use docintel_domain::traits::{CompletionRequest, LlmProvider};
use std::fmt::Display;
use tracing::debug;

/// One way of turning document text into a record
pub trait ExtractionStrategy {
    /// Method reported for records this strategy produces
    fn method(&self) -> ExtractionMethod;

    /// Extract and normalize fields from `text`
    fn extract(&self, text: &str) -> Result<ExtractionRecord, ExtractorError>;
}

/// Asks a language model for JSON and recovers it defensively
pub struct LlmStrategy<L> {
    llm: L,
    config: ExtractorConfig,
}

impl<L> LlmStrategy<L> {
    /// Create a strategy over a provider
    pub fn new(llm: L, config: ExtractorConfig) -> Self {
        Self { llm, config }
    }
}

impl<L> ExtractionStrategy for LlmStrategy<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Model
    }

    fn extract(&self, text: &str) -> Result<ExtractionRecord, ExtractorError> {
        let prompt = PromptBuilder::new(text, self.config.max_prompt_chars).build();
        debug!("Extraction prompt length: {} chars", prompt.len());

        let request = CompletionRequest::new(EXTRACTION_SYSTEM_PROMPT, prompt)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = self
            .llm
            .complete(&request)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        let record = normalize(&recover_object(&response)?);
        if record.is_empty() {
            return Err(ExtractorError::EmptyResult);
        }
        Ok(record)
    }
}

/// Regex cascade over the full text
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleStrategy;

impl ExtractionStrategy for RuleStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Rules
    }

    fn extract(&self, text: &str) -> Result<ExtractionRecord, ExtractorError> {
        Ok(normalize(&rules::apply(text)))
    }
}
