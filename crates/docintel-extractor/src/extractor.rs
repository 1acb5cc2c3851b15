//! Field extraction over stored documents

use crate::config::ExtractorConfig;
use crate::strategy::{ExtractionStrategy, LlmStrategy, RuleStrategy};
use crate::types::{
    Extraction, ExtractionRecord, Field, FieldCheck, FieldKind, ValidationReport,
};
use docintel_domain::traits::LlmProvider;
use docintel_domain::DocumentId;
use docintel_store::DocumentStore;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{info, warn};

type BoxedStrategy = Box<dyn ExtractionStrategy + Send + Sync>;

/// Pulls the logistics fields out of stored documents
///
/// The model strategy, when configured, runs first. Any failure or empty
/// result hands over to the regex cascade, which always answers.
pub struct FieldExtractor {
    store: Arc<DocumentStore>,
    primary: Option<BoxedStrategy>,
    fallback: RuleStrategy,
}

impl FieldExtractor {
    /// Create an extractor that only uses the regex cascade
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            primary: None,
            fallback: RuleStrategy,
        }
    }

    /// Create an extractor that tries `llm` first
    ///
    /// When `config.use_model` is off the model is ignored.
    pub fn with_model<L>(store: Arc<DocumentStore>, llm: L, config: ExtractorConfig) -> Self
    where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: Display,
    {
        let primary: Option<BoxedStrategy> = if config.use_model {
            Some(Box::new(LlmStrategy::new(llm, config)))
        } else {
            None
        };
        Self {
            store,
            primary,
            fallback: RuleStrategy,
        }
    }

    /// Whether a model strategy is configured
    pub fn has_model(&self) -> bool {
        self.primary.is_some()
    }

    /// Extract fields for a stored document
    ///
    /// Unknown documents yield an all-null record.
    pub fn extract(&self, id: &DocumentId) -> ExtractionRecord {
        self.extract_document(id)
            .map(|extraction| extraction.record)
            .unwrap_or_default()
    }

    /// Extract fields for a stored document, reporting the method used
    pub fn extract_document(&self, id: &DocumentId) -> Option<Extraction> {
        let Some(document) = self.store.get(id) else {
            warn!("Extraction requested for unknown document {}", id);
            return None;
        };
        info!("Extracting fields from document {} ({} chunks)", id, document.chunk_count());
        Some(self.extract_text(&document.full_text()))
    }

    /// Extract fields from raw text
    pub fn extract_text(&self, text: &str) -> Extraction {
        if let Some(primary) = &self.primary {
            match primary.extract(text) {
                Ok(record) => {
                    info!("Model extraction populated {} fields", record.populated_count());
                    return Extraction {
                        record,
                        method: primary.method(),
                    };
                }
                Err(e) => warn!("Model extraction failed, using rules: {}", e),
            }
        }

        let record = self.fallback.extract(text).unwrap_or_default();
        info!("Rule extraction populated {} fields", record.populated_count());
        Extraction {
            record,
            method: self.fallback.method(),
        }
    }
}

/// Completeness and per-field sanity checks
pub fn validate(record: &ExtractionRecord) -> ValidationReport {
    let fields: Vec<FieldCheck> = Field::ALL.iter().map(|f| check(record, *f)).collect();
    let fields_extracted = Field::ALL.iter().filter(|f| record.has(**f)).count();
    let total_fields = Field::ALL.len();

    ValidationReport {
        fields_extracted,
        total_fields,
        extraction_rate: fields_extracted as f64 / total_fields as f64,
        fields,
    }
}

fn check(record: &ExtractionRecord, field: Field) -> FieldCheck {
    let mut issues = Vec::new();

    match field.kind() {
        FieldKind::Amount => {
            let value = match field {
                Field::Rate => record.rate,
                _ => record.weight,
            };
            match value {
                None => issues.push("not extracted".to_string()),
                Some(v) if !(v.is_finite() && v > 0.0) => {
                    issues.push("value should be positive".to_string())
                }
                Some(_) => {}
            }
        }
        kind => match record.get(field) {
            None => issues.push("not extracted".to_string()),
            Some(value) if value.trim().is_empty() => issues.push("value is empty".to_string()),
            Some(value) => {
                if kind == FieldKind::Currency
                    && !(value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase()))
                {
                    issues.push("currency should be a 3-letter code".to_string());
                }
            }
        },
    }

    FieldCheck {
        field,
        valid: issues.is_empty(),
        issues,
    }
}
