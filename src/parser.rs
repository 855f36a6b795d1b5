//! Best-effort parsing of raw model output
//!
//! Model replies are unreliable: an answer requested as a JSON array may
//! arrive wrapped in prose, half-quoted, or as a bare comma list. Each
//! expected shape gets a fallback ladder that degrades instead of failing.
//! Only the object shape surfaces a parse error, because the downstream
//! merge logic needs a structured value to work with.

use crate::{Error, Result};
use serde_json::Value;

/// Parse a reply expected to be a JSON array of strings.
///
/// Fallback order: strict JSON array parse, then the first `[...]` span
/// found in the text, then a comma split with quote stripping, then the
/// whole text as a single item. Nothing usable yields an empty list.
pub fn parse_string_list(raw: &str) -> Vec<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if let Some(items) = parse_json_array(text) {
        return items;
    }

    // The array may be embedded in surrounding prose.
    if let Some(span) = bracketed_span(text) {
        if let Some(items) = parse_json_array(&span) {
            return items;
        }
    }

    if text.contains(',') {
        // A leading label ("tags: a, b, c") is dropped before splitting.
        let body = match text.split_once(':') {
            Some((prefix, rest)) if !prefix.contains(',') => rest,
            _ => text,
        };
        return body
            .split(',')
            .map(strip_item)
            .filter(|s| !s.is_empty())
            .collect();
    }

    let item = strip_item(text);
    if item.is_empty() {
        Vec::new()
    } else {
        vec![item]
    }
}

/// Parse a reply expected to be plain prose: pass-through, trimmed.
pub fn parse_short_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parse a reply expected to be a JSON object.
///
/// Strict: anything that does not parse as a JSON object is a
/// [`Error::Parse`]. There is no lenient fallback here.
pub fn parse_json_object(raw: &str) -> Result<Value> {
    let text = raw.trim();
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Parse(format!("expected a JSON object: {}", e)))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(Error::Parse(format!(
            "expected a JSON object, got a JSON {}",
            json_type_name(&value)
        )))
    }
}

fn parse_json_array(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// First `[...]` span in the text, newlines flattened so a pretty-printed
/// array still matches.
fn bracketed_span(text: &str) -> Option<String> {
    let flat = text.replace('\n', " ");
    let start = flat.find('[')?;
    let end = flat[start..].find(']')? + start;
    Some(flat[start..=end].to_string())
}

fn strip_item(item: &str) -> String {
    item.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
