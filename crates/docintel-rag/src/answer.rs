//! Grounded answer generation with confidence scoring
//!
//! Given the retrieved chunks for a question, the generator:
//!
//! 1. Returns a fixed answer when nothing was retrieved
//! 2. Refuses without calling the model when the best match is too weak
//! 3. Asks the language model to answer from the context, or falls back to
//!    keyword sentence matching when no model is configured or the call
//!    fails
//! 4. Scores the answer and applies the missing-information guardrail
//!
//! Generation never fails: every error path degrades to a lower-confidence
//! answer.

use crate::config::RagConfig;
use crate::guardrails::{self, LOW_SIMILARITY_ANSWER, NOT_FOUND_ANSWER, NO_CONTEXT_ANSWER};
use crate::prompt::{build_context, build_user_prompt, ANSWER_SYSTEM_PROMPT};
use docintel_domain::confidence::answer_confidence;
use docintel_domain::traits::{CompletionRequest, LlmProvider};
use docintel_domain::{ConfidenceLevel, RetrievalResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Sentences kept by the keyword fallback
pub const FALLBACK_MAX_SENTENCES: usize = 2;

/// Which branch produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPath {
    /// Nothing was retrieved
    NoContext,
    /// Best match below the similarity floor
    LowSimilarity,
    /// Language model answer
    Model,
    /// Keyword sentence matching
    KeywordFallback,
}

/// A scored answer with its supporting source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    pub answer: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Confidence band
    pub level: ConfidenceLevel,
    /// Preview of the best-matching chunk
    pub source_text: String,
    /// Position of the best-matching chunk, `None` without context
    pub source_chunk_index: Option<usize>,
    /// Branch that produced the answer
    pub path: AnswerPath,
}

/// Turns retrieval results into scored answers
pub struct AnswerGenerator<L> {
    llm: Option<L>,
    config: RagConfig,
}

impl<L> AnswerGenerator<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a generator backed by a language model
    pub fn new(llm: L, config: RagConfig) -> Self {
        Self {
            llm: Some(llm),
            config,
        }
    }

    /// Create a generator that always uses the keyword fallback
    pub fn without_model(config: RagConfig) -> Self {
        Self { llm: None, config }
    }

    /// Create a generator from an optional model
    pub fn with_optional_model(llm: Option<L>, config: RagConfig) -> Self {
        Self { llm, config }
    }

    /// Active configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer `query` from `results`
    pub fn answer(&self, query: &str, results: &[RetrievalResult]) -> Answer {
        let Some(top) = results.first() else {
            debug!("No context retrieved; returning fixed answer");
            return self.finish(NO_CONTEXT_ANSWER.to_string(), 0.0, String::new(), None, AnswerPath::NoContext);
        };

        let source_text = source_preview(&top.text, self.config.source_preview_chars);

        if let Some(similarity) = guardrails::low_similarity(results, &self.config.thresholds) {
            info!(
                "Top similarity {:.3} below {:.3}; refusing to answer",
                similarity, self.config.thresholds.low
            );
            return self.finish(
                LOW_SIMILARITY_ANSWER.to_string(),
                similarity,
                source_text,
                Some(top.position),
                AnswerPath::LowSimilarity,
            );
        }

        let context = build_context(results);
        let (answer, path) = match self.generate(query, &context) {
            Some(answer) => (answer, AnswerPath::Model),
            None => (keyword_fallback(query, &context), AnswerPath::KeywordFallback),
        };

        let mut confidence = answer_confidence(&answer, results, &self.config.weights);
        if guardrails::admits_missing(&answer) {
            confidence = match path {
                AnswerPath::Model => guardrails::discount_model(confidence),
                _ => guardrails::cap_fallback(confidence),
            };
            debug!("Answer admits missing information; confidence now {:.3}", confidence);
        }

        self.finish(answer, confidence, source_text, Some(top.position), path)
    }

    /// Ask the model; `None` when there is no model or the call fails
    fn generate(&self, query: &str, context: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let request = CompletionRequest::new(ANSWER_SYSTEM_PROMPT, build_user_prompt(context, query))
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        match llm.complete(&request) {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                warn!("Model call failed, using keyword fallback: {}", e);
                None
            }
        }
    }

    fn finish(
        &self,
        answer: String,
        confidence: f64,
        source_text: String,
        source_chunk_index: Option<usize>,
        path: AnswerPath,
    ) -> Answer {
        let confidence = confidence.clamp(0.0, 1.0);
        Answer {
            answer,
            confidence,
            level: ConfidenceLevel::from_score(confidence, &self.config.thresholds),
            source_text,
            source_chunk_index,
            path,
        }
    }
}

/// Answer by quoting context sentences that mention a query word
///
/// Sentences are split on `". "` across the whole context. A sentence
/// matches when its lowercase form contains any lowercase query word as a
/// substring. The first two matches are joined and terminated with a
/// period.
pub fn keyword_fallback(query: &str, context: &str) -> String {
    let keywords: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    let matches: Vec<&str> = context
        .split(". ")
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .take(FALLBACK_MAX_SENTENCES)
        .collect();

    if matches.is_empty() {
        NOT_FOUND_ANSWER.to_string()
    } else {
        format!("{}.", matches.join(". "))
    }
}

/// First `max_chars` characters of a chunk, with `...` if truncated
pub fn source_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docintel_llm::MockProvider;

    fn results() -> Vec<RetrievalResult> {
        vec![
            RetrievalResult::new("Shipper: ABC Corp. Consignee: XYZ Ltd", 0.8, 2),
            RetrievalResult::new("Carrier: Speedy Transport. Rate: 2500 USD", 0.6, 0),
        ]
    }

    #[test]
    fn test_no_context() {
        let generator = AnswerGenerator::new(MockProvider::new("unused"), RagConfig::default());
        let answer = generator.answer("who?", &[]);
        assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
        assert_eq!(answer.confidence, 0.0);
        assert_eq!(answer.source_text, "");
        assert_eq!(answer.source_chunk_index, None);
        assert_eq!(answer.path, AnswerPath::NoContext);
    }

    #[test]
    fn test_low_similarity_skips_model() {
        let provider = MockProvider::new("should not be used");
        let generator = AnswerGenerator::new(provider.clone(), RagConfig::default());

        let answer = generator.answer("who?", &[RetrievalResult::new("text", 0.1, 4)]);
        assert_eq!(answer.answer, LOW_SIMILARITY_ANSWER);
        assert_eq!(answer.confidence, 0.1);
        assert_eq!(answer.level, ConfidenceLevel::Insufficient);
        assert_eq!(answer.source_chunk_index, Some(4));
        assert_eq!(answer.path, AnswerPath::LowSimilarity);
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_model_answer_scored() {
        let provider = MockProvider::new("ABC Corp");
        let generator = AnswerGenerator::new(provider.clone(), RagConfig::default());

        let answer = generator.answer("Who is the shipper?", &results());
        assert_eq!(answer.answer, "ABC Corp");
        assert_eq!(answer.path, AnswerPath::Model);
        assert_eq!(answer.source_chunk_index, Some(2));
        assert_eq!(provider.call_count(), 1);

        // coverage: "abc" matches but "corp" only appears as "corp."
        // agreement: the two chunks share no words
        let expected = 0.5 * 0.8 + 0.3 * 0.5 + 0.2 * 0.0;
        assert!((answer.confidence - expected).abs() < 1e-9);
        assert_eq!(answer.level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_model_request_parameters() {
        let provider = MockProvider::new("ABC Corp");
        let generator = AnswerGenerator::new(provider.clone(), RagConfig::default());
        generator.answer("Who is the shipper?", &results());

        let request = provider.last_request().unwrap();
        assert_eq!(request.system_prompt, ANSWER_SYSTEM_PROMPT);
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.max_tokens, 1024);
        assert!(request.user_prompt.contains("Shipper: ABC Corp. Consignee: XYZ Ltd\n\nCarrier"));
        assert!(request.user_prompt.contains("QUESTION: Who is the shipper?"));
    }

    #[test]
    fn test_model_not_found_is_discounted() {
        let provider = MockProvider::new("Not found in document");
        let generator = AnswerGenerator::new(provider, RagConfig::default());

        let answer = generator.answer("What is the weight?", &results());
        // coverage: none of the answer words appear in the top chunk
        let undiscounted = 0.5 * 0.8 + 0.3 * 0.0 + 0.2 * 0.0;
        assert!((answer.confidence - undiscounted * 0.3).abs() < 1e-9);
        assert_eq!(answer.path, AnswerPath::Model);
    }

    #[test]
    fn test_model_failure_uses_keyword_fallback() {
        let generator = AnswerGenerator::new(MockProvider::failing(), RagConfig::default());
        let answer = generator.answer("carrier", &results());
        assert_eq!(answer.path, AnswerPath::KeywordFallback);
        assert_eq!(answer.answer, "Consignee: XYZ Ltd\n\nCarrier: Speedy Transport.");
    }

    #[test]
    fn test_fallback_not_found_is_capped() {
        let generator = AnswerGenerator::<MockProvider>::without_model(RagConfig::default());
        let answer = generator.answer("zzz", &results());
        assert_eq!(answer.answer, NOT_FOUND_ANSWER);
        assert_eq!(answer.path, AnswerPath::KeywordFallback);
        assert!(answer.confidence <= 0.3);
    }

    #[test]
    fn test_source_preview_truncates() {
        let long = "x".repeat(600);
        let preview = source_preview(&long, 500);
        assert_eq!(preview.len(), 503);
        assert!(preview.ends_with("..."));
        assert_eq!(source_preview("short", 500), "short");
        assert_eq!(source_preview("ééé", 2), "éé...");
    }

    #[test]
    fn test_keyword_fallback() {
        let context = "Shipper: ABC Corp. Consignee: XYZ Ltd\n\nCarrier: Speedy. Rate: 2500 USD";
        assert_eq!(keyword_fallback("shipper", context), "Shipper: ABC Corp.");
        assert_eq!(
            keyword_fallback("corp rate", context),
            "Shipper: ABC Corp. Rate: 2500 USD."
        );
        assert_eq!(keyword_fallback("weight", context), NOT_FOUND_ANSWER);
        assert_eq!(keyword_fallback("", context), NOT_FOUND_ANSWER);
    }

    #[test]
    fn test_confidence_always_clamped() {
        let generator = AnswerGenerator::new(MockProvider::new(""), RagConfig::default());
        let answer = generator.answer("q", &[RetrievalResult::new("only", 1.0, 0)]);
        assert!((0.0..=1.0).contains(&answer.confidence));
    }
}
