//! Docintel Retrieval and Answering
//!
//! Turns a document's chunks into grounded, confidence-scored answers.
//!
//! # Pipeline
//!
//! 1. **Chunking** ([`chunking`]): sentence-bounded, overlapping segments
//! 2. **Retrieval** ([`retriever`]): query embedding plus exact k-NN over
//!    the document's vector index, distances mapped to similarities
//! 3. **Answering** ([`answer`]): context window, model call or keyword
//!    fallback, composite confidence and guardrails ([`guardrails`])
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use docintel_domain::traits::EmbeddingModel;
//! use docintel_domain::DocumentId;
//! use docintel_llm::MockProvider;
//! use docintel_rag::{AnswerGenerator, Chunker, RagConfig, Retriever};
//! use docintel_store::{DocumentStore, HashingEmbedder};
//!
//! let store = Arc::new(DocumentStore::in_memory());
//! let embedder = HashingEmbedder::new(128);
//!
//! let chunks = Chunker::default().chunk("Carrier: Speedy Transport");
//! let vectors: Vec<Vec<f32>> = chunks.iter().map(|c| embedder.embed(c).unwrap()).collect();
//! let id = DocumentId::generate("rc.txt");
//! store.put(&id, Some("rc.txt"), chunks, &vectors).unwrap();
//!
//! let retriever = Retriever::new(Arc::clone(&store), embedder);
//! let generator = AnswerGenerator::new(MockProvider::new("Speedy Transport"), RagConfig::default());
//!
//! let results = retriever.retrieve("Who is the carrier?", &id);
//! let answer = generator.answer("Who is the carrier?", &results);
//! assert_eq!(answer.answer, "Speedy Transport");
//! ```

#![warn(missing_docs)]

pub mod answer;
pub mod chunking;
pub mod config;
pub mod guardrails;
pub mod prompt;
pub mod retriever;

pub use answer::{Answer, AnswerGenerator, AnswerPath};
pub use chunking::Chunker;
pub use config::RagConfig;
pub use retriever::Retriever;
