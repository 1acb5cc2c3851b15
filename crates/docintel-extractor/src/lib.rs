//! Docintel Extractor
//!
//! Pulls eleven logistics fields (ids, parties, dates, equipment, mode,
//! rate, currency, weight, carrier) out of a stored document.
//!
//! # Strategies
//!
//! 1. **Model**: a structured prompt asks for a JSON object, which is
//!    recovered from fences, prose and trailing commas before parsing
//! 2. **Rules**: an ordered regex cascade per field, used whenever the
//!    model is absent, fails, or returns nothing usable
//!
//! Both paths share one normalization step, so records look the same
//! regardless of which strategy produced them.
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use docintel_extractor::{validate, FieldExtractor};
//! use docintel_store::DocumentStore;
//!
//! let extractor = FieldExtractor::new(Arc::new(DocumentStore::in_memory()));
//! let extraction = extractor.extract_text("BOL#: 123456789\nShipper: ABC Corp\nRate: $2,500.00");
//!
//! assert_eq!(extraction.record.shipper.as_deref(), Some("ABC Corp"));
//! assert_eq!(validate(&extraction.record).fields_extracted, 3);
//! ```

#![warn(missing_docs)]

mod clean;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod rules;
mod strategy;
mod types;


pub use clean::normalize;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{validate, FieldExtractor};
pub use parser::recover_object;
pub use rules::{apply as apply_rules, FieldRule};
pub use strategy::{ExtractionStrategy, LlmStrategy, RuleStrategy};
pub use types::{
    Extraction, ExtractionMethod, ExtractionRecord, Field, FieldCheck, FieldKind,
    ValidationReport,
};
