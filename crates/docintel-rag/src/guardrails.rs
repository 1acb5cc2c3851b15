//! Guardrails that override or discount generated answers
//!
//! - Before generation: a top similarity under the low threshold
//!   short-circuits to a fixed refusal and the model is never called.
//! - After generation: an answer admitting the information is missing
//!   has its confidence discounted (model path) or capped (keyword path).
//!
//! At most one guardrail applies to a given response.

use docintel_domain::{ConfidenceThresholds, RetrievalResult};

/// Answer when retrieval produced nothing
pub const NO_CONTEXT_ANSWER: &str = "No relevant information found in the document.";

/// Answer when the best match is too dissimilar to trust
pub const LOW_SIMILARITY_ANSWER: &str =
    "I cannot confidently answer this question based on the document content.";

/// Keyword fallback answer when no sentence matches
pub const NOT_FOUND_ANSWER: &str = "Not found in document.";

/// Multiplier for model answers that admit missing information
pub const MODEL_MISSING_DISCOUNT: f64 = 0.3;

/// Ceiling for keyword answers that admit missing information
pub const FALLBACK_MISSING_CAP: f64 = 0.3;

const MISSING_MARKERS: [&str; 2] = ["not found", "cannot answer"];

/// The top similarity, if it falls below the low threshold
pub fn low_similarity(results: &[RetrievalResult], thresholds: &ConfidenceThresholds) -> Option<f64> {
    results
        .first()
        .map(|top| top.similarity)
        .filter(|s| *s < thresholds.low)
}

/// Whether an answer admits the information is missing
pub fn admits_missing(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    MISSING_MARKERS.iter().any(|m| lower.contains(m))
}

/// Discount a model answer's confidence
pub fn discount_model(confidence: f64) -> f64 {
    confidence * MODEL_MISSING_DISCOUNT
}

/// Cap a keyword answer's confidence
pub fn cap_fallback(confidence: f64) -> f64 {
    confidence.min(FALLBACK_MISSING_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_similarity() {
        let t = ConfidenceThresholds::default();
        assert_eq!(low_similarity(&[], &t), None);
        assert_eq!(low_similarity(&[RetrievalResult::new("x", 0.1, 0)], &t), Some(0.1));
        assert_eq!(low_similarity(&[RetrievalResult::new("x", 0.3, 0)], &t), None);
    }

    #[test]
    fn test_admits_missing() {
        assert!(admits_missing("Not found in document"));
        assert!(admits_missing("I CANNOT ANSWER that"));
        assert!(!admits_missing("The shipper is ABC Corp"));
    }

    #[test]
    fn test_adjustments() {
        assert!((discount_model(0.8) - 0.24).abs() < 1e-12);
        assert_eq!(cap_fallback(0.8), 0.3);
        assert_eq!(cap_fallback(0.1), 0.1);
    }
}
