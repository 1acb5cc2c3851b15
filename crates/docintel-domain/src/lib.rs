//! Docintel Domain Layer
//!
//! This crate contains the core value types and trait interfaces of the
//! document intelligence pipeline. It carries no I/O and defines the
//! concepts every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **Document**: an ingested text, identified by an opaque [`DocumentId`]
//! - **Retrieval result**: a chunk with its similarity to a query
//! - **Confidence**: a composite [0, 1] score estimating answer trust,
//!   distinct from similarity
//! - **Capabilities**: embedding, completion and blob storage, consumed
//!   through the traits in [`traits`]
//!
//! ## Architecture
//!
//! - Pure logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod document;
pub mod traits;

// Re-exports for convenience
pub use confidence::{ConfidenceLevel, ConfidenceThresholds, ConfidenceWeights};
pub use document::{DocumentId, RetrievalResult};
pub use traits::{BlobStore, CompletionRequest, EmbeddingModel, LlmProvider};
