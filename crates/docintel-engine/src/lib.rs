//! Docintel Engine
//!
//! Single entry point tying together upload decoding, chunking, embedding,
//! storage, question answering and field extraction.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use docintel_engine::{DocIntel, EngineConfig};
//! use docintel_llm::MockProvider;
//! use docintel_store::{DocumentStore, HashingEmbedder};
//!
//! let engine: DocIntel<HashingEmbedder, MockProvider> = DocIntel::new(
//!     Arc::new(DocumentStore::in_memory()),
//!     HashingEmbedder::new(256),
//!     None,
//!     EngineConfig::default(),
//! );
//!
//! let receipt = engine.ingest(b"Shipper: ABC Corp", "bol.txt").unwrap();
//! let record = engine.extract(receipt.id.as_str()).unwrap();
//! assert_eq!(record.shipper.as_deref(), Some("ABC Corp"));
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
mod text;

pub use engine::{DocIntel, EngineConfig, IngestReceipt};
pub use error::EngineError;
pub use text::{normalize_text, PlainTextExtractor, TextExtractor, PLAIN_TEXT_EXTENSIONS};
