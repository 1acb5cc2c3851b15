//! Answer confidence computation
//!
//! Implements the deterministic scoring used by the answer generator:
//!
//! 1. Distance → similarity transform (`1 / (1 + d)`)
//! 2. Composite confidence from three signals:
//!    top-result similarity, answer/chunk word coverage and agreement
//!    between the two best chunks
//! 3. Banding of the final score into coarse levels
//!
//! The weights and thresholds are empirical and kept at their original
//! values. Callers may override them through [`ConfidenceWeights`] and
//! [`ConfidenceThresholds`].

use crate::RetrievalResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Weight of the top-result similarity (default: 0.5)
pub const SIMILARITY_WEIGHT: f64 = 0.5;

/// Weight of the answer/top-chunk word coverage (default: 0.3)
pub const COVERAGE_WEIGHT: f64 = 0.3;

/// Weight of the agreement between the two best chunks (default: 0.2)
pub const AGREEMENT_WEIGHT: f64 = 0.2;

/// Agreement used when fewer than two comparable chunks exist
pub const NEUTRAL_AGREEMENT: f64 = 0.5;

/// Scores at or above this are high confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Scores at or above this are medium confidence
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Scores below this are not trusted
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Weights for the three confidence signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Weight of the top-result similarity
    pub similarity: f64,
    /// Weight of the answer/top-chunk word coverage
    pub coverage: f64,
    /// Weight of the top-two chunk agreement
    pub agreement: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            similarity: SIMILARITY_WEIGHT,
            coverage: COVERAGE_WEIGHT,
            agreement: AGREEMENT_WEIGHT,
        }
    }
}

/// Thresholds separating the confidence bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Lower bound of [`ConfidenceLevel::High`]
    pub high: f64,
    /// Lower bound of [`ConfidenceLevel::Medium`]
    pub medium: f64,
    /// Lower bound of [`ConfidenceLevel::Low`]; also the similarity floor
    /// below which no answer is generated
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: HIGH_CONFIDENCE_THRESHOLD,
            medium: MEDIUM_CONFIDENCE_THRESHOLD,
            low: LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Coarse confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Score >= high threshold
    High,
    /// Score >= medium threshold
    Medium,
    /// Score >= low threshold
    Low,
    /// Score below the low threshold
    Insufficient,
}

impl ConfidenceLevel {
    /// Band a confidence score
    pub fn from_score(score: f64, thresholds: &ConfidenceThresholds) -> Self {
        if score >= thresholds.high {
            ConfidenceLevel::High
        } else if score >= thresholds.medium {
            ConfidenceLevel::Medium
        } else if score >= thresholds.low {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Insufficient
        }
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Insufficient => "insufficient",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a squared Euclidean distance to a similarity in (0, 1]
///
/// Monotonically decreasing and strictly positive. Negative distances are
/// treated as zero and non-finite ones as the largest representable
/// distance. Not normalized across documents.
pub fn similarity_from_distance(distance: f64) -> f64 {
    let d = if distance.is_nan() {
        f64::MAX
    } else {
        distance.clamp(0.0, f64::MAX)
    };
    1.0 / (1.0 + d)
}

/// Lowercased whitespace-separated words of a text
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Fraction of answer words that also appear in the chunk
///
/// Zero if the answer has no words.
pub fn coverage(answer: &str, chunk: &str) -> f64 {
    let answer_words = word_set(answer);
    if answer_words.is_empty() {
        return 0.0;
    }
    let chunk_words = word_set(chunk);
    let shared = answer_words.intersection(&chunk_words).count();
    shared as f64 / answer_words.len() as f64
}

/// Jaccard overlap of the word sets of two texts
///
/// `None` if either text has no words.
pub fn jaccard(a: &str, b: &str) -> Option<f64> {
    let a = word_set(a);
    let b = word_set(b);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    Some(intersection as f64 / union as f64)
}

/// Agreement between the two best results, neutral if not comparable
pub fn agreement(results: &[RetrievalResult]) -> f64 {
    match results {
        [first, second, ..] => jaccard(&first.text, &second.text).unwrap_or(NEUTRAL_AGREEMENT),
        _ => NEUTRAL_AGREEMENT,
    }
}

/// Weighted sum of the three signals, clamped to [0, 1]
pub fn compose(similarity: f64, coverage: f64, agreement: f64, weights: &ConfidenceWeights) -> f64 {
    let raw = weights.similarity * similarity
        + weights.coverage * coverage
        + weights.agreement * agreement;

    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Composite confidence of an answer given the results it was built from
///
/// Zero when there are no results.
pub fn answer_confidence(
    answer: &str,
    results: &[RetrievalResult],
    weights: &ConfidenceWeights,
) -> f64 {
    let Some(top) = results.first() else {
        return 0.0;
    };

    compose(
        top.similarity,
        coverage(answer, &top.text),
        agreement(results),
        weights,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, similarity: f64, position: usize) -> RetrievalResult {
        RetrievalResult::new(text, similarity, position)
    }

    #[test]
    fn test_similarity_endpoints() {
        assert_eq!(similarity_from_distance(0.0), 1.0);
        assert_eq!(similarity_from_distance(1.0), 0.5);
        assert_eq!(similarity_from_distance(9.0), 0.1);
        assert_eq!(similarity_from_distance(-4.0), 1.0);
        assert!(similarity_from_distance(f64::INFINITY) > 0.0);
        assert!(similarity_from_distance(f64::NAN) > 0.0);
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage("", "anything"), 0.0);
        assert_eq!(coverage("ABC Corp", "shipper: abc corp"), 1.0);
        assert_eq!(coverage("abc xyz", "abc def"), 0.5);
    }

    #[test]
    fn test_agreement_neutral_cases() {
        assert_eq!(agreement(&[]), NEUTRAL_AGREEMENT);
        assert_eq!(agreement(&[result("one chunk", 0.9, 0)]), NEUTRAL_AGREEMENT);
        assert_eq!(
            agreement(&[result("words", 0.9, 0), result("   ", 0.8, 1)]),
            NEUTRAL_AGREEMENT
        );
    }

    #[test]
    fn test_agreement_jaccard() {
        let results = [result("a b c", 0.9, 0), result("b c d", 0.8, 1)];
        assert_eq!(agreement(&results), 0.5);
    }

    #[test]
    fn test_answer_confidence_formula() {
        let results = [
            result("the rate is 2500", 0.8, 0),
            result("the rate is 2500", 0.7, 1),
        ];
        // 0.5 * 0.8 + 0.3 * 1.0 + 0.2 * 1.0
        let score = answer_confidence("rate 2500", &results, &ConfidenceWeights::default());
        assert!((score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_answer_confidence_empty_results() {
        assert_eq!(answer_confidence("x", &[], &ConfidenceWeights::default()), 0.0);
    }

    #[test]
    fn test_levels() {
        let t = ConfidenceThresholds::default();
        assert_eq!(ConfidenceLevel::from_score(0.95, &t), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.7, &t), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.55, &t), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.3, &t), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.1, &t), ConfidenceLevel::Insufficient);
        assert_eq!(ConfidenceLevel::Medium.to_string(), "medium");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: similarity lies in (0, 1] for every non-negative distance
        #[test]
        fn test_similarity_bounded(d in 0.0f64..1e12) {
            let s = similarity_from_distance(d);
            prop_assert!(s > 0.0);
            prop_assert!(s <= 1.0);
        }

        /// Property: similarity is strictly decreasing in distance
        #[test]
        fn test_similarity_decreasing(d in 0.0f64..1e3, delta in 1e-3f64..1e3) {
            prop_assert!(similarity_from_distance(d) > similarity_from_distance(d + delta));
        }

        /// Property: composition is clamped for arbitrary signals and weights
        #[test]
        fn test_compose_clamped(
            s in any::<f64>(),
            c in any::<f64>(),
            a in any::<f64>(),
            ws in any::<f64>(),
            wc in any::<f64>(),
            wa in any::<f64>(),
        ) {
            let weights = ConfidenceWeights { similarity: ws, coverage: wc, agreement: wa };
            let score = compose(s, c, a, &weights);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        /// Property: answer confidence stays in [0, 1] for arbitrary texts,
        /// including empty answers and single-chunk contexts
        #[test]
        fn test_answer_confidence_clamped(
            answer in ".{0,80}",
            chunks in proptest::collection::vec((".{0,80}", 0.0f64..=1.0), 0..4),
        ) {
            let results: Vec<RetrievalResult> = chunks
                .into_iter()
                .enumerate()
                .map(|(i, (text, sim))| RetrievalResult::new(text, sim, i))
                .collect();
            let score = answer_confidence(&answer, &results, &ConfidenceWeights::default());
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
