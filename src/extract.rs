//! Normalization of backend responses into plain text.
//!
//! Backends do not agree on a response shape, so extraction is an ordered list
//! of rules. Each rule looks for text in one known shape and the first rule
//! producing a non-empty string wins. The last rule always succeeds.

use serde_json::Value;

/// A single way of pulling text out of a backend response.
pub type ExtractionRule = fn(&Value) -> Option<String>;

/// Fields tried, in order, on the first element of `results`.
const RESULT_FIELDS: [&str; 3] = ["generated_text", "output", "text"];

/// Rules applied by [`extract_text`], in priority order.
pub const EXTRACTION_RULES: &[ExtractionRule] = &[first_result, top_level_text, render_raw];

/// Extracts the text of a backend response. Never fails.
///
/// Every rule is tried in turn: a `results` array with no usable field still
/// lets a top-level `text` win before the raw rendering.
pub fn extract_text(response: &Value) -> String {
    EXTRACTION_RULES
        .iter()
        .find_map(|rule| rule(response))
        .unwrap_or_else(|| response.to_string())
}

/// `{"results": [{"generated_text" | "output" | "text": ...}, ...]}`
pub fn first_result(response: &Value) -> Option<String> {
    let first = response.get("results")?.as_array()?.first()?;
    RESULT_FIELDS
        .iter()
        .find_map(|field| first.get(field).and_then(non_empty_text))
}

/// `{"text": ...}`
pub fn top_level_text(response: &Value) -> Option<String> {
    response.get("text").and_then(non_empty_text)
}

/// The whole response rendered as a string.
pub fn render_raw(response: &Value) -> Option<String> {
    match response {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
