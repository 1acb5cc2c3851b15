//! Recovery of a JSON object from free-form model output

use crate::error::ExtractorError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

static OBJECT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static TRAILING_BRACE_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\}").expect("valid regex"));
static TRAILING_BRACKET_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\]").expect("valid regex"));

/// Pull the outermost `{...}` span out of a response and parse it
///
/// Tolerates prose or code fences around the object and trailing commas
/// before closing braces and brackets.
pub fn recover_object(response: &str) -> Result<Map<String, Value>, ExtractorError> {
    let span = OBJECT_SPAN
        .find(response)
        .ok_or_else(|| ExtractorError::InvalidFormat("no JSON object in response".to_string()))?
        .as_str();

    let repaired = TRAILING_BRACE_COMMA.replace_all(span, "}");
    let repaired = TRAILING_BRACKET_COMMA.replace_all(&repaired, "]");
    debug!("Recovered {} bytes of JSON from model output", repaired.len());

    match serde_json::from_str::<Value>(&repaired)? {
        Value::Object(map) => Ok(map),
        other => Err(ExtractorError::InvalidFormat(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
