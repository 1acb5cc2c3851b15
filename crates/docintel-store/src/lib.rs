//! Docintel Storage Layer
//!
//! Owns every ingested document for the life of the process: its chunks, its
//! vector index and its metadata.
//!
//! # Architecture
//!
//! - An in-memory map (`parking_lot::RwLock`) is the authoritative cache
//! - Every `put` is mirrored best-effort to a [`BlobStore`] as three blobs:
//!   `{id}.index`, `{id}_chunks.json` and `{id}_meta.json`
//! - `get` reads through: memory first, then durable storage, repopulating
//!   memory on a hit
//! - Nothing is ever evicted; restarting the process clears the cache
//! - Rehydration is single-flight per identifier
//!
//! # Examples
//!
//! ```
//! use docintel_domain::DocumentId;
//! use docintel_store::DocumentStore;
//!
//! let store = DocumentStore::in_memory();
//! let id = DocumentId::generate("bol.txt");
//! store
//!     .put(&id, Some("bol.txt"), vec!["Shipper: ABC Corp".into()], &[vec![1.0, 0.0]])
//!     .unwrap();
//!
//! let doc = store.get(&id).unwrap();
//! assert_eq!(doc.chunk_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod blob;
pub mod embedding;
pub mod vector_index;

pub use blob::{FsBlobStore, MemoryBlobStore};
pub use embedding::{EmbeddingError, HashingEmbedder};
pub use vector_index::{Neighbor, VectorIndex, VectorIndexError};

use docintel_domain::traits::BlobStore;
use docintel_domain::DocumentId;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Chunks and vectors disagree
    #[error("Inconsistent document: {0}")]
    Inconsistent(String),

    /// Index construction failed
    #[error("Vector index error: {0}")]
    VectorIndex(#[from] VectorIndexError),

    /// Blob (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable storage failed
    #[error("Blob storage error: {0}")]
    Blob(#[from] io::Error),
}

/// A fully loaded document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier
    pub id: DocumentId,
    /// Original filename, if known
    pub filename: Option<String>,
    /// Ordered chunk texts
    pub chunks: Vec<String>,
    /// One vector per chunk, same order
    pub index: VectorIndex,
}

impl Document {
    /// Number of chunks (always equal to the index cardinality)
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// All chunks joined with newlines
    pub fn full_text(&self) -> String {
        self.chunks.join("\n")
    }
}

/// Where a listed document currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Residency {
    /// Loaded in the in-memory cache
    Memory,
    /// Only on durable storage
    Disk,
}

/// Listing entry for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Identifier
    pub id: DocumentId,
    /// Original filename, if known
    pub filename: Option<String>,
    /// Chunk count, if known without loading the document
    pub chunk_count: Option<usize>,
    /// Where the document lives
    pub residency: Residency,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentMeta {
    filename: Option<String>,
    chunk_count: usize,
    dimension: usize,
}

/// Cache slot; `Released` is a resident document whose index was dropped
enum Slot {
    Ready(Arc<Document>),
    Released {
        filename: Option<String>,
        chunks: Vec<String>,
    },
}

fn index_key(id: &DocumentId) -> String {
    format!("{}.index", id)
}

fn chunks_key(id: &DocumentId) -> String {
    format!("{}_chunks.json", id)
}

fn meta_key(id: &DocumentId) -> String {
    format!("{}_meta.json", id)
}

type SharedBlobStore = Box<dyn BlobStore<Error = io::Error> + Send + Sync>;

/// Write-through, read-through document cache
pub struct DocumentStore {
    blobs: SharedBlobStore,
    documents: RwLock<HashMap<DocumentId, Slot>>,
    loading: Mutex<HashMap<DocumentId, Arc<Mutex<()>>>>,
}

impl DocumentStore {
    /// Create a store mirroring to `blobs`
    pub fn new(blobs: impl BlobStore<Error = io::Error> + Send + Sync + 'static) -> Self {
        Self {
            blobs: Box::new(blobs),
            documents: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store mirroring to files under `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let blobs = FsBlobStore::open(dir)?;
        info!("Document store at {}", blobs.root().display());
        Ok(Self::new(blobs))
    }

    /// Create a store whose durable tier is process memory
    pub fn in_memory() -> Self {
        Self::new(MemoryBlobStore::new())
    }

    /// Insert a document and mirror it to durable storage
    ///
    /// # Errors
    ///
    /// Fails if the chunk and vector counts differ or the vectors cannot
    /// form an index. Durable write failures are logged, not returned.
    pub fn put(
        &self,
        id: &DocumentId,
        filename: Option<&str>,
        chunks: Vec<String>,
        vectors: &[Vec<f32>],
    ) -> Result<Arc<Document>, StoreError> {
        if chunks.len() != vectors.len() {
            return Err(StoreError::Inconsistent(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let index = VectorIndex::build(vectors)?;
        let document = Arc::new(Document {
            id: id.clone(),
            filename: filename.map(str::to_string),
            chunks,
            index,
        });

        self.documents
            .write()
            .insert(id.clone(), Slot::Ready(Arc::clone(&document)));

        if let Err(e) = self.mirror(&document) {
            warn!("Failed to mirror document {} to durable storage: {}", id, e);
        }

        debug!(
            "Stored document {} ({} chunks, dimension {})",
            id,
            document.chunk_count(),
            document.index.dimension()
        );
        Ok(document)
    }

    fn mirror(&self, document: &Document) -> Result<(), StoreError> {
        let meta = DocumentMeta {
            filename: document.filename.clone(),
            chunk_count: document.chunk_count(),
            dimension: document.index.dimension(),
        };

        self.blobs
            .write(&index_key(&document.id), &document.index.to_bytes()?)?;
        self.blobs
            .write(&chunks_key(&document.id), &serde_json::to_vec(&document.chunks)?)?;
        self.blobs
            .write(&meta_key(&document.id), &serde_json::to_vec(&meta)?)?;
        Ok(())
    }

    /// Look up a document, rehydrating from durable storage if needed
    ///
    /// Returns `None` when neither memory nor durable storage holds a
    /// complete, consistent pair of index and chunks.
    pub fn get(&self, id: &DocumentId) -> Option<Arc<Document>> {
        if let Some(Slot::Ready(doc)) = self.documents.read().get(id) {
            debug!("Cache hit for {}", id);
            return Some(Arc::clone(doc));
        }

        let gate = Arc::clone(self.loading.lock().entry(id.clone()).or_default());
        let loaded = {
            let _guard = gate.lock();
            self.load(id)
        };
        self.loading.lock().remove(id);
        loaded
    }

    /// Fill the cache slot for `id`; caller holds the per-key gate
    fn load(&self, id: &DocumentId) -> Option<Arc<Document>> {
        let released = match self.documents.read().get(id) {
            // Another caller finished loading while we waited
            Some(Slot::Ready(doc)) => return Some(Arc::clone(doc)),
            Some(Slot::Released { filename, chunks }) => Some((filename.clone(), chunks.clone())),
            None => None,
        };

        let document = match released {
            Some((filename, chunks)) => {
                warn!("Document {} is resident without its index; reloading index", id);
                let index = self.read_index(id)?;
                Document {
                    id: id.clone(),
                    filename,
                    chunks,
                    index,
                }
            }
            None => {
                debug!("Cache miss for {}; trying durable storage", id);
                let index = self.read_index(id)?;
                let chunks = self.read_chunks(id)?;
                let filename = self.read_meta(id).and_then(|m| m.filename);
                Document {
                    id: id.clone(),
                    filename,
                    chunks,
                    index,
                }
            }
        };

        if document.index.len() != document.chunk_count() {
            warn!(
                "Discarding {}: index holds {} vectors but there are {} chunks",
                id,
                document.index.len(),
                document.chunk_count()
            );
            return None;
        }

        info!("Rehydrated document {} ({} chunks)", id, document.chunk_count());
        let document = Arc::new(document);
        self.documents
            .write()
            .insert(id.clone(), Slot::Ready(Arc::clone(&document)));
        Some(document)
    }

    fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        match self.blobs.read(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read blob {}: {}", key, e);
                None
            }
        }
    }

    fn read_index(&self, id: &DocumentId) -> Option<VectorIndex> {
        let bytes = self.read_blob(&index_key(id))?;
        VectorIndex::from_bytes(&bytes)
            .map_err(|e| warn!("Unreadable index for {}: {}", id, e))
            .ok()
    }

    fn read_chunks(&self, id: &DocumentId) -> Option<Vec<String>> {
        let bytes = self.read_blob(&chunks_key(id))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| warn!("Unreadable chunks for {}: {}", id, e))
            .ok()
    }

    fn read_meta(&self, id: &DocumentId) -> Option<DocumentMeta> {
        let bytes = self.read_blob(&meta_key(id))?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Drop the in-memory index of a resident document, keeping its chunks
    ///
    /// The next `get` reloads the index from durable storage. Returns
    /// whether a resident index was released.
    pub fn release_index(&self, id: &DocumentId) -> bool {
        let mut documents = self.documents.write();
        let Some(Slot::Ready(doc)) = documents.get(id) else {
            return false;
        };

        let slot = Slot::Released {
            filename: doc.filename.clone(),
            chunks: doc.chunks.clone(),
        };
        documents.insert(id.clone(), slot);
        debug!("Released index for {}", id);
        true
    }

    /// Whether a fully loaded copy is in memory
    pub fn is_resident(&self, id: &DocumentId) -> bool {
        matches!(self.documents.read().get(id), Some(Slot::Ready(_)))
    }

    /// Summaries of every document in memory or on durable storage
    pub fn list(&self) -> Vec<DocumentSummary> {
        let mut summaries: Vec<DocumentSummary> = self
            .documents
            .read()
            .iter()
            .map(|(id, slot)| {
                let (filename, chunk_count) = match slot {
                    Slot::Ready(doc) => (doc.filename.clone(), doc.chunk_count()),
                    Slot::Released { filename, chunks } => (filename.clone(), chunks.len()),
                };
                DocumentSummary {
                    id: id.clone(),
                    filename,
                    chunk_count: Some(chunk_count),
                    residency: Residency::Memory,
                }
            })
            .collect();

        let keys = match self.blobs.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to enumerate durable storage: {}", e);
                Vec::new()
            }
        };

        for key in &keys {
            let Some(id) = key
                .strip_suffix(".index")
                .and_then(|raw| DocumentId::parse(raw).ok())
            else {
                continue;
            };
            if summaries.iter().any(|s| s.id == id) || !keys.contains(&chunks_key(&id)) {
                continue;
            }

            let meta = self.read_meta(&id);
            summaries.push(DocumentSummary {
                filename: meta.as_ref().and_then(|m| m.filename.clone()),
                chunk_count: meta.map(|m| m.chunk_count),
                id,
                residency: Residency::Disk,
            });
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}
