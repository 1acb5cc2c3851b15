//! Error types for the Docintel engine.

use docintel_store::StoreError;
use thiserror::Error;

/// Engine operation errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// No document with this identifier
    #[error("Document not found: {0}")]
    NotFound(String),

    /// No usable text or chunks could be derived from the upload
    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),

    /// The embedding capability failed during ingestion
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Storing the document failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
