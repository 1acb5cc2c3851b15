//! The document intelligence facade

use crate::error::EngineError;
use crate::text::{normalize_text, PlainTextExtractor, TextExtractor};
use docintel_domain::traits::{EmbeddingModel, LlmProvider};
use docintel_domain::DocumentId;
use docintel_extractor::{validate, Extraction, ExtractionRecord, ExtractorConfig, FieldExtractor, ValidationReport};
use docintel_rag::{Answer, AnswerGenerator, Chunker, RagConfig, Retriever};
use docintel_store::{DocumentStore, DocumentSummary};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info};

/// Tunables for every stage of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunking, retrieval and answering
    pub rag: RagConfig,
    /// Field extraction
    pub extraction: ExtractorConfig,
}

impl EngineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.rag.validate()?;
        self.extraction.validate()
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReceipt {
    /// Identifier for later `ask` and `extract` calls
    pub id: DocumentId,
    /// Uploaded filename
    pub filename: String,
    /// Number of chunks stored
    pub chunk_count: usize,
}

/// Ingests documents, answers questions about them and extracts fields
///
/// Holds one embedding model for both ingestion and queries and an optional
/// language model shared by answering and extraction. Without a language
/// model, answers use keyword matching and extraction uses the regex
/// cascade.
pub struct DocIntel<E, L> {
    store: Arc<DocumentStore>,
    embedder: Arc<E>,
    chunker: Chunker,
    retriever: Retriever<Arc<E>>,
    generator: AnswerGenerator<Arc<L>>,
    extractor: FieldExtractor,
    text_extractor: Box<dyn TextExtractor + Send + Sync>,
}

impl<E, L> DocIntel<E, L>
where
    E: EmbeddingModel + Send + Sync + 'static,
    E::Error: Display,
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Assemble the pipeline over `store`
    pub fn new(store: Arc<DocumentStore>, embedder: E, llm: Option<L>, config: EngineConfig) -> Self {
        let embedder = Arc::new(embedder);
        let llm = llm.map(Arc::new);

        let retriever = Retriever::new(Arc::clone(&store), Arc::clone(&embedder)).with_top_k(config.rag.top_k);
        let extractor = match &llm {
            Some(llm) => FieldExtractor::with_model(Arc::clone(&store), Arc::clone(llm), config.extraction.clone()),
            None => FieldExtractor::new(Arc::clone(&store)),
        };

        Self {
            chunker: Chunker::from_config(&config.rag),
            generator: AnswerGenerator::with_optional_model(llm, config.rag),
            store,
            embedder,
            retriever,
            extractor,
            text_extractor: Box::new(PlainTextExtractor),
        }
    }

    /// Replace the upload decoder
    pub fn with_text_extractor(mut self, text_extractor: impl TextExtractor + Send + Sync + 'static) -> Self {
        self.text_extractor = Box::new(text_extractor);
        self
    }

    /// The backing store
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Decode, chunk, embed and store an upload
    pub fn ingest(&self, bytes: &[u8], filename: &str) -> Result<IngestReceipt, EngineError> {
        let raw = self.text_extractor.extract_text(bytes, filename)?;
        let text = normalize_text(&raw);
        if text.is_empty() {
            return Err(EngineError::ExtractionFailure(format!("no text found in {}", filename)));
        }

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(EngineError::ExtractionFailure(format!("no chunks derived from {}", filename)));
        }
        debug!("Split {} into {} chunks", filename, chunks.len());

        let vectors = chunks
            .iter()
            .map(|chunk| self.embedder.embed(chunk))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::Embedding(e.to_string()))?;

        let id = DocumentId::generate(filename);
        let chunk_count = chunks.len();
        self.store.put(&id, Some(filename), chunks, &vectors)?;
        info!("Ingested {} as {} ({} chunks)", filename, id, chunk_count);

        Ok(IngestReceipt {
            id,
            filename: filename.to_string(),
            chunk_count,
        })
    }

    /// Answer a question about a stored document
    pub fn ask(&self, id: &str, question: &str) -> Result<Answer, EngineError> {
        let id = self.resolve(id)?;
        let results = self.retriever.retrieve(question, &id);
        debug!("Retrieved {} chunks for question on {}", results.len(), id);
        Ok(self.generator.answer(question, &results))
    }

    /// Extract the logistics fields of a stored document
    pub fn extract(&self, id: &str) -> Result<ExtractionRecord, EngineError> {
        self.extraction(id).map(|extraction| extraction.record)
    }

    /// Extract fields, reporting which strategy produced them
    pub fn extraction(&self, id: &str) -> Result<Extraction, EngineError> {
        let id = self.resolve(id)?;
        self.extractor
            .extract_document(&id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Completeness report for a record
    pub fn validate(&self, record: &ExtractionRecord) -> ValidationReport {
        validate(record)
    }

    /// Every known document, in memory or on disk
    pub fn list(&self) -> Vec<DocumentSummary> {
        self.store.list()
    }

    fn resolve(&self, id: &str) -> Result<DocumentId, EngineError> {
        let parsed = DocumentId::parse(id).map_err(|_| EngineError::NotFound(id.to_string()))?;
        match self.store.get(&parsed) {
            Some(_) => Ok(parsed),
            None => Err(EngineError::NotFound(id.to_string())),
        }
    }
}
