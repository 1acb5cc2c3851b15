//! Sentence-bounded text chunking with word overlap
//!
//! Normalized text is split into sentence-like units on the literal
//! delimiter `". "` and packed greedily into chunks of at most
//! `target_size` words. When a unit would overflow the running chunk, the
//! chunk is closed and the next one is seeded with the last `overlap` words
//! of the closed chunk.
//!
//! The packer never splits inside a sentence: a sentence longer than the
//! budget becomes one oversized chunk. Line breaks inside a unit are kept.
//!
//! # Examples
//!
//! ```
//! use docintel_rag::chunking::Chunker;
//!
//! let chunker = Chunker::new(500, 100);
//! let chunks = chunker.chunk("Shipper: ABC Corp\nRate: $2,500.00");
//! assert_eq!(chunks, vec!["Shipper: ABC Corp\nRate: $2,500.00"]);
//! ```

use crate::config::RagConfig;

/// Default chunk budget in words
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap in words
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Delimiter between sentence-like units
pub const SENTENCE_DELIMITER: &str = ". ";

/// Greedy sentence packer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    target_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl Chunker {
    /// Create a chunker with a word budget and overlap
    pub fn new(target_size: usize, overlap: usize) -> Self {
        Self {
            target_size,
            overlap,
        }
    }

    /// Create a chunker from retrieval configuration
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into ordered, non-empty chunks
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_words = 0;

        for unit in sentence_units(text) {
            let unit_words = word_count(&unit);

            if current_words + unit_words <= self.target_size {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&unit);
                current_words += unit_words;
                continue;
            }

            let seed = tail_words(&current, self.overlap);
            let closed = current.trim();
            if !closed.is_empty() {
                chunks.push(closed.to_string());
            }

            current = if seed.is_empty() {
                unit
            } else {
                format!("{} {}", seed, unit)
            };
            current_words = word_count(&current);
        }

        let last = current.trim();
        if !last.is_empty() {
            chunks.push(last.to_string());
        }
        chunks
    }
}

/// Split text on `". "`, giving every unit but the last its period back
///
/// Joining the units with single spaces reproduces the input exactly.
pub fn sentence_units(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    let last = pieces.len() - 1;
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            if i < last {
                format!("{}.", piece)
            } else {
                piece.to_string()
            }
        })
        .collect()
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Last `n` words of `text` joined by single spaces
fn tail_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(n);
    words[start..].join(" ")
}
