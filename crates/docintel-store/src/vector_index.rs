//! Flat Vector Index for Exact Nearest-Neighbor Search
//!
//! Holds the chunk embeddings of one document in a single contiguous buffer
//! and answers k-nearest-neighbor queries by brute force over squared
//! Euclidean distance, so recall is exact for any k.
//!
//! # Layout
//!
//! Vector `i` occupies `data[i * dimension..(i + 1) * dimension]`. The
//! position of a vector equals the position of its chunk.
//!
//! # Persistence
//!
//! The index serializes to a self-describing JSON blob holding the
//! dimension and the flat data. Deserialization validates that the data
//! length is a multiple of the dimension.
//!
//! # Examples
//!
//! ```
//! use docintel_store::vector_index::VectorIndex;
//!
//! let index = VectorIndex::build(&[vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
//! let hits = index.search(&[3.0, 4.0], 1).unwrap();
//! assert_eq!(hits[0].position, 1);
//! assert_eq!(hits[0].distance, 0.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Building from no vectors, or from zero-length vectors
    #[error("Cannot build an index from empty input")]
    Empty,

    /// A deserialized blob is internally inconsistent
    #[error("Corrupt index blob: {0}")]
    Corrupt(String),
}

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Squared Euclidean distance to the query
    pub distance: f32,
    /// Position of the matching vector
    pub position: usize,
}

/// Exact flat L2 index over one document's chunk vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from vectors that all share one dimension
    ///
    /// The dimension is taken from the first vector.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, VectorIndexError> {
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 {
            return Err(VectorIndexError::Empty);
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in vectors {
            if vector.len() != dimension {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { dimension, data })
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the index holds no vectors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return up to `k` nearest vectors by ascending squared L2 distance
    ///
    /// Returns every vector when `k` exceeds the cardinality. Ties keep
    /// ascending position order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| Neighbor {
                distance: squared_l2(query, vector),
                position,
            })
            .collect();

        // sort_by is stable, so equal distances keep position order
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    /// Serialize to a self-describing blob
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize and validate a blob produced by [`VectorIndex::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VectorIndexError> {
        let index: VectorIndex = serde_json::from_slice(bytes)
            .map_err(|e| VectorIndexError::Corrupt(e.to_string()))?;

        if index.dimension == 0 {
            return Err(VectorIndexError::Corrupt("zero dimension".to_string()));
        }
        if index.data.len() % index.dimension != 0 {
            return Err(VectorIndexError::Corrupt(format!(
                "{} values do not divide into vectors of dimension {}",
                index.data.len(),
                index.dimension
            )));
        }
        Ok(index)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VectorIndex {
        VectorIndex::build(&[
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![5.0, 5.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_build_and_len() {
        let index = sample();
        assert_eq!(index.len(), 4);
        assert_eq!(index.dimension(), 2);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_build_rejects_empty_and_ragged() {
        assert!(matches!(VectorIndex::build(&[]), Err(VectorIndexError::Empty)));
        assert!(matches!(
            VectorIndex::build(&[vec![]]),
            Err(VectorIndexError::Empty)
        ));
        assert!(matches!(
            VectorIndex::build(&[vec![1.0, 2.0], vec![1.0]]),
            Err(VectorIndexError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_search_orders_by_distance() {
        let hits = sample().search(&[0.9, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 0, 2]);
        assert!((hits[0].distance - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_search_distance_is_squared() {
        let hits = sample().search(&[0.0, 0.0], 4).unwrap();
        assert_eq!(hits[3].position, 3);
        assert_eq!(hits[3].distance, 50.0);
    }

    #[test]
    fn test_search_k_larger_than_len() {
        let hits = sample().search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_search_ties_keep_position_order() {
        let index = VectorIndex::build(&[vec![1.0], vec![-1.0], vec![1.0]]).unwrap();
        let hits = index.search(&[0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let result = sample().search(&[1.0, 2.0, 3.0], 1);
        assert!(matches!(
            result,
            Err(VectorIndexError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_blob_roundtrip() {
        let index = sample();
        let bytes = index.to_bytes().unwrap();
        assert_eq!(VectorIndex::from_bytes(&bytes).unwrap(), index);
    }

    #[test]
    fn test_corrupt_blob_rejected() {
        let ragged = br#"{"dimension":3,"data":[1.0,2.0]}"#;
        assert!(matches!(
            VectorIndex::from_bytes(ragged),
            Err(VectorIndexError::Corrupt(_))
        ));
        assert!(VectorIndex::from_bytes(b"not json").is_err());
    }
}
