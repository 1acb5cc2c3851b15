//! Document identity and retrieval value types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Opaque, collision-resistant document identifier
///
/// Generated identifiers are the first 12 hex characters of
/// `SHA-256(filename ‖ random UUIDv4)`, so ingesting the same file twice
/// yields two distinct documents.
///
/// Identifiers double as durable storage keys, so parsing only accepts
/// 1-64 characters from `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Length of generated identifiers in hex characters
    pub const GENERATED_LEN: usize = 12;

    /// Longest identifier accepted by [`DocumentId::parse`]
    pub const MAX_LEN: usize = 64;

    /// Generate a fresh identifier for a document with the given filename
    pub fn generate(filename: &str) -> Self {
        let salt = uuid::Uuid::new_v4();

        let mut hasher = Sha256::new();
        hasher.update(filename.as_bytes());
        hasher.update(salt.to_string().as_bytes());

        let mut id = hex::encode(hasher.finalize());
        id.truncate(Self::GENERATED_LEN);
        Self(id)
    }

    /// Parse a caller-supplied identifier
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() || s.len() > Self::MAX_LEN {
            return Err(format!(
                "Invalid document id length {} (expected 1..={})",
                s.len(),
                Self::MAX_LEN
            ));
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(format!("Invalid character {:?} in document id", bad));
        }

        Ok(Self(s.to_string()))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One retrieved chunk with its similarity to the query
///
/// Results are ordered by descending similarity. `position` is the chunk's
/// index in the document's chunk sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Chunk text
    pub text: String,
    /// Similarity score in (0, 1]
    pub similarity: f64,
    /// Position of the chunk within its document
    pub position: usize,
}

impl RetrievalResult {
    /// Create a new retrieval result
    pub fn new(text: impl Into<String>, similarity: f64, position: usize) -> Self {
        Self {
            text: text.into(),
            similarity,
            position,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every well-formed key round-trips through parse and Display
        #[test]
        fn test_valid_ids_roundtrip(s in "[A-Za-z0-9_-]{1,64}") {
            let id = DocumentId::parse(&s).unwrap();
            prop_assert_eq!(id.to_string(), s);
        }
    }
}
