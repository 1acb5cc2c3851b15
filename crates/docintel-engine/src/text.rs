//! Turning uploaded bytes into normalized text

use crate::error::EngineError;
use std::path::Path;

/// Extensions accepted by [`PlainTextExtractor`]
pub const PLAIN_TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "csv"];

/// Produces text from an uploaded file
pub trait TextExtractor {
    /// Decode `bytes`; `filename` selects the format
    fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String, EngineError>;
}

/// Reads plain-text uploads, decoding UTF-8 with a Latin-1 fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String, EngineError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if let Some(ext) = &extension {
            if !PLAIN_TEXT_EXTENSIONS.contains(&ext.as_str()) {
                return Err(EngineError::ExtractionFailure(format!(
                    "unsupported file type '.{}'",
                    ext
                )));
            }
        }

        let text = match std::str::from_utf8(bytes) {
            Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
            Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
        };
        Ok(text)
    }
}

/// Trim every line, drop blank lines, join with `\n`
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        let extractor = PlainTextExtractor;
        assert_eq!(extractor.extract_text(b"hi", "a.txt").unwrap(), "hi");
        assert_eq!(extractor.extract_text(b"hi", "A.MD").unwrap(), "hi");
        assert_eq!(extractor.extract_text(b"hi", "rows.csv").unwrap(), "hi");
        assert_eq!(extractor.extract_text(b"hi", "README").unwrap(), "hi");
        assert!(matches!(
            extractor.extract_text(b"%PDF", "scan.pdf"),
            Err(EngineError::ExtractionFailure(_))
        ));
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(PlainTextExtractor.extract_text(&bytes, "x.txt").unwrap(), "café");
    }

    #[test]
    fn test_bom_is_dropped() {
        let bytes = "\u{feff}BOL".as_bytes();
        assert_eq!(PlainTextExtractor.extract_text(bytes, "x.txt").unwrap(), "BOL");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a  \n\n\t\n b\r\n"), "a\nb");
        assert_eq!(normalize_text(" \n \n"), "");
    }
}
