//! Query-time nearest-neighbor retrieval

use docintel_domain::confidence::similarity_from_distance;
use docintel_domain::traits::EmbeddingModel;
use docintel_domain::{DocumentId, RetrievalResult};
use docintel_store::DocumentStore;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of chunks retrieved per query
pub const DEFAULT_TOP_K: usize = 3;

/// Embeds queries and ranks a document's chunks against them
///
/// Every failure (unknown document, embedding error, dimension mismatch)
/// degrades to an empty result.
pub struct Retriever<E> {
    store: Arc<DocumentStore>,
    embedder: E,
    top_k: usize,
}

impl<E> Retriever<E>
where
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Create a retriever over `store` using `embedder` for queries
    pub fn new(store: Arc<DocumentStore>, embedder: E) -> Self {
        Self {
            store,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the default number of results
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The configured default number of results
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve the default number of chunks for `query`
    pub fn retrieve(&self, query: &str, id: &DocumentId) -> Vec<RetrievalResult> {
        self.retrieve_top(query, id, self.top_k)
    }

    /// Retrieve up to `top_k` chunks ordered by descending similarity
    pub fn retrieve_top(&self, query: &str, id: &DocumentId, top_k: usize) -> Vec<RetrievalResult> {
        let Some(document) = self.store.get(id) else {
            debug!("Retrieval for unknown document {}", id);
            return Vec::new();
        };

        let query_vector = match self.embedder.embed(query) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to embed query for {}: {}", id, e);
                return Vec::new();
            }
        };

        let neighbors = match document.index.search(&query_vector, top_k) {
            Ok(n) => n,
            Err(e) => {
                warn!("Search failed for {}: {}", id, e);
                return Vec::new();
            }
        };

        neighbors
            .into_iter()
            .filter_map(|n| {
                let Some(text) = document.chunks.get(n.position) else {
                    warn!("Index position {} out of range for {}", n.position, id);
                    return None;
                };
                Some(RetrievalResult::new(
                    text.clone(),
                    similarity_from_distance(f64::from(n.distance)),
                    n.position,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docintel_store::HashingEmbedder;

    /// Embeds by looking up the first character's code point
    struct FirstChar;

    impl EmbeddingModel for FirstChar {
        type Error = String;

        fn embed(&self, text: &str) -> Result<Vec<f32>, String> {
            text.chars()
                .next()
                .map(|c| vec![c as u32 as f32])
                .ok_or_else(|| "empty".to_string())
        }
    }

    fn store_with(id: &DocumentId, chunks: &[&str], vectors: Vec<Vec<f32>>) -> Arc<DocumentStore> {
        let store = Arc::new(DocumentStore::in_memory());
        store
            .put(id, None, chunks.iter().map(|s| s.to_string()).collect(), &vectors)
            .unwrap();
        store
    }

    #[test]
    fn test_results_ordered_by_similarity() {
        let id = DocumentId::parse("doc").unwrap();
        let store = store_with(&id, &["a", "b", "c", "d"], vec![vec![97.0], vec![98.0], vec![99.0], vec![100.0]]);
        let retriever = Retriever::new(store, FirstChar);

        let results = retriever.retrieve("c?", &id);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].position, 2);
        assert_eq!(results[0].similarity, 1.0);
        assert_eq!(results[1].position, 1);
        assert_eq!(results[1].similarity, 0.5);
        assert_eq!(results[2].position, 3);
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_top_k_larger_than_document() {
        let id = DocumentId::parse("doc").unwrap();
        let store = store_with(&id, &["a", "b"], vec![vec![97.0], vec![98.0]]);
        let retriever = Retriever::new(store, FirstChar).with_top_k(10);
        assert_eq!(retriever.retrieve("a", &id).len(), 2);
    }

    #[test]
    fn test_unknown_document_is_empty() {
        let store = Arc::new(DocumentStore::in_memory());
        let retriever = Retriever::new(store, FirstChar);
        let id = DocumentId::parse("missing").unwrap();
        assert!(retriever.retrieve("a", &id).is_empty());
    }

    #[test]
    fn test_embedding_failure_is_empty() {
        let id = DocumentId::parse("doc").unwrap();
        let store = store_with(&id, &["a"], vec![vec![97.0]]);
        let retriever = Retriever::new(store, FirstChar);
        assert!(retriever.retrieve("", &id).is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_empty() {
        let id = DocumentId::parse("doc").unwrap();
        let store = store_with(&id, &["a"], vec![vec![1.0, 2.0]]);
        let retriever = Retriever::new(store, FirstChar);
        assert!(retriever.retrieve("a", &id).is_empty());
    }

    #[test]
    fn test_hashing_embedder_finds_relevant_chunk() {
        let embedder = HashingEmbedder::new(256);
        let chunks = [
            "Shipper: ABC Corp, 12 Main Street",
            "Weight: 42000 lbs on 20 pallets",
            "Carrier: Speedy Transport LLC",
        ];
        let vectors = chunks.iter().map(|c| embedder.embed(c).unwrap()).collect();
        let id = DocumentId::parse("doc").unwrap();
        let store = store_with(&id, &chunks, vectors);

        let retriever = Retriever::new(store, embedder).with_top_k(1);
        let results = retriever.retrieve("what is the weight in lbs", &id);
        assert_eq!(results[0].position, 1);
    }
}
