//! Hashing Embedder for Offline Text Vectorization
//!
//! Provides a deterministic bag-of-words embedding that needs no model files
//! and no network. Texts sharing vocabulary land close together, which is
//! enough for retrieval over a single document and for tests.
//!
//! # Implementation
//!
//! Lowercased alphanumeric tokens are hashed (FNV-1a) into a fixed number of
//! buckets with a hash-derived sign, then the vector is normalized to unit
//! length. FNV keeps the mapping stable across toolchains, so persisted
//! indexes stay searchable after a rebuild.
//!
//! # Examples
//!
//! ```rust
//! use docintel_domain::traits::EmbeddingModel;
//! use docintel_store::embedding::HashingEmbedder;
//!
//! let model = HashingEmbedder::new(384);
//! let embedding = model.embed("The shipper is ABC Corp").unwrap();
//! assert_eq!(embedding.len(), 384);
//!
//! // Same text always produces same embedding
//! assert_eq!(embedding, model.embed("The shipper is ABC Corp").unwrap());
//! ```

use docintel_domain::traits::EmbeddingModel;
use thiserror::Error;

/// Default embedding dimension
pub const DEFAULT_DIMENSION: usize = 384;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Deterministic feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of `dimension` values
    ///
    /// A dimension of zero is raised to one.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Dimension of produced vectors
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

impl EmbeddingModel for HashingEmbedder {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        for token in tokens {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        // Normalize to unit length; tokenless text stays the zero vector
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[test]
    fn test_embedding_deterministic() {
        let model = HashingEmbedder::new(64);
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(model.embed(text).unwrap(), model.embed(text).unwrap());
    }

    #[test]
    fn test_embedding_dimension() {
        let model = HashingEmbedder::new(128);
        assert_eq!(model.embed("test").unwrap().len(), 128);
        assert_eq!(model.dimension(), 128);
        assert_eq!(HashingEmbedder::new(0).dimension(), 1);
    }

    #[test]
    fn test_embedding_normalized() {
        let model = HashingEmbedder::default();
        let embedding = model.embed("Carrier: Speedy Transport").unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embedding_case_and_punctuation_insensitive() {
        let model = HashingEmbedder::default();
        assert_eq!(
            model.embed("Shipper: ABC Corp.").unwrap(),
            model.embed("shipper abc corp").unwrap()
        );
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let model = HashingEmbedder::default();
        let query = model.embed("who is the carrier").unwrap();
        let related = model.embed("the carrier is Speedy Transport").unwrap();
        let unrelated = model.embed("pallets weigh 42000 lbs").unwrap();
        assert!(l2(&query, &related) < l2(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_rejected() {
        let model = HashingEmbedder::default();
        assert!(model.embed("").is_err());
        assert!(model.embed("   \n").is_err());
        assert!(model.embed("...").unwrap().iter().all(|v| *v == 0.0));
    }
}
