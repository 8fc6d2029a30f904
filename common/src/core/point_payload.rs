use serde_json::{Map, Value};
use tracing::debug;

/// Keys under which a point payload may carry a serialized content node,
/// i.e. a JSON string holding the node structure (text, metadata, ...).
pub const NODE_CONTENT_KEYS: [&str; 2] = ["_node_content", "node_content"];

/// Direct payload keys that may hold the point text, in priority order.
const DIRECT_TEXT_KEYS: [&str; 4] = ["text", "content", "_text", "_node_text"];

/// Minimum length (in characters) for a string payload value to be part of
/// the last-resort text reconstruction.
const LONG_STRING_MIN_CHARS: usize = 20;

/// Extracts the best available text from a point payload.
///
/// Tried in order:
/// 1. a serialized content node (under one of [`NODE_CONTENT_KEYS`]): parsed
///    as JSON, its non-empty `text` field wins. A payload that fails to parse
///    falls through to the next rule.
/// 2. the first present string among the direct text keys
///    (`text`, `content`, `_text`, `_node_text`).
/// 3. every string value longer than [`LONG_STRING_MIN_CHARS`] characters,
///    joined with a blank line, in payload key order.
///
/// Returns `None` when the payload is empty or nothing matched.
pub fn extract_text(payload: &Map<String, Value>) -> Option<String> {
    if payload.is_empty() {
        return None;
    }

    for key in NODE_CONTENT_KEYS {
        let Some(Value::String(node_content)) = payload.get(key) else {
            continue;
        };
        match serde_json::from_str::<Value>(node_content) {
            Ok(node) => {
                if let Some(text) = node.get("text").and_then(Value::as_str) {
                    if !text.is_empty() {
                        return Some(text.to_string());
                    }
                }
            }
            Err(error) => {
                debug!(key, %error, "Node content is not valid JSON, falling back");
            }
        }
    }

    if let Some(text) = first_string_field(payload, &DIRECT_TEXT_KEYS) {
        return Some(text);
    }

    let long_strings: Vec<&str> = payload
        .values()
        .filter_map(Value::as_str)
        .filter(|value| value.chars().count() > LONG_STRING_MIN_CHARS)
        .collect();
    if !long_strings.is_empty() {
        return Some(long_strings.join("\n\n"));
    }

    None
}

/// Returns the first non-empty string found in `payload` under the given
/// keys, tried in order.
pub fn first_string_field(payload: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        payload
            .get(*key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

/// Best-effort check for a vector already embedded in the point payload.
///
/// True only when the serialized content node mentions an `embedding` field
/// that is not serialized as `"embedding": null` (the spacing matches how the
/// ingestion side serializes its nodes). Vectors stored outside the payload
/// are invisible to this check: such points are reported as missing and will
/// be recomputed.
pub fn has_embedded_vector(payload: &Map<String, Value>) -> bool {
    match payload.get("_node_content") {
        Some(Value::String(node_content)) => {
            node_content.contains("embedding") && !node_content.contains("\"embedding\": null")
        }
        _ => false,
    }
}

/// Parses the serialized content node of a payload and returns its
/// `metadata` object, if any.
pub fn node_metadata(payload: &Map<String, Value>) -> Option<Map<String, Value>> {
    for key in NODE_CONTENT_KEYS {
        let Some(Value::String(node_content)) = payload.get(key) else {
            continue;
        };
        if let Ok(node) = serde_json::from_str::<Value>(node_content) {
            if let Some(Value::Object(metadata)) = node.get("metadata") {
                return Some(metadata.clone());
            }
        }
    }
    None
}
