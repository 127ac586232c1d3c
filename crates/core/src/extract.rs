//! Response text extraction.
//!
//! The OpenClaw agent prints JSON in several shapes depending on its version and
//! on which tools ran. This module turns whatever it printed into the one string
//! Home Assistant should speak. Every recognised shape is a pure function from the
//! parsed value to an optional string and the first one that matches wins.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Keys checked, in order, when the output is a flat object.
pub const FLAT_KEYS: [&str; 5] = ["response", "text", "message", "content", "speech"];

/// Finds `'text': 'value'` or `"text": "value"` in output that is not JSON.
static TEXT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:'text'|"text"):\s*(?:'([^']+)'|"([^"]+)")"#).expect("valid text pattern")
});

/// The shape an agent reply was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"payloads": [{"text": ...}, ...]}`
    PayloadArray,
    /// `{"response": {"speech": {"plain": {"speech": ...}}}}`
    NestedSpeech,
    /// One of [`FLAT_KEYS`] at the top level.
    FlatKey,
    /// A JSON string.
    PlainString,
    /// Anything else, including output that is not JSON at all.
    Unstructured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub shape: ResponseShape,
    pub text: String,
}

type ObjectRule = fn(&Map<String, Value>) -> Option<String>;

const OBJECT_RULES: [(ResponseShape, ObjectRule); 3] = [
    (ResponseShape::PayloadArray, payload_text),
    (ResponseShape::NestedSpeech, nested_speech),
    (ResponseShape::FlatKey, flat_key),
];

/// Extracts the display text from raw agent output. Never fails: output that
/// matches no known shape is returned as-is.
pub fn extract_response_text(output: &str) -> String {
    extract(output).text
}

/// Like [`extract_response_text`] but also reports which shape matched.
pub fn extract(output: &str) -> Extracted {
    let value = match serde_json::from_str::<Value>(output) {
        Ok(value) => value,
        Err(_) => {
            return Extracted {
                shape: ResponseShape::Unstructured,
                text: find_text_pattern(output).unwrap_or_else(|| output.to_string()),
            };
        }
    };

    if let Value::Object(map) = &value {
        for (shape, rule) in OBJECT_RULES {
            if let Some(text) = rule(map) {
                return Extracted { shape, text };
            }
        }
    }

    if let Value::String(text) = value {
        return Extracted {
            shape: ResponseShape::PlainString,
            text,
        };
    }

    Extracted {
        shape: ResponseShape::Unstructured,
        text: find_text_field(&value).unwrap_or_else(|| value.to_string()),
    }
}

/// Prepares extracted text for speech: drops markdown bold markers and turns
/// literal `\n` escapes into real newlines.
pub fn clean_speech(text: &str) -> String {
    text.replace("**", "").replace("\\n", "\n")
}

fn payload_text(map: &Map<String, Value>) -> Option<String> {
    let first = map.get("payloads")?.as_array()?.first()?;
    first.as_object()?.get("text").map(coerce)
}

fn nested_speech(map: &Map<String, Value>) -> Option<String> {
    let speech = map.get("response")?.as_object()?.get("speech")?;
    let plain_speech = speech
        .as_object()
        .and_then(|s| s.get("plain"))
        .and_then(Value::as_object)
        .and_then(|plain| plain.get("speech"));
    Some(coerce(plain_speech.unwrap_or(speech)))
}

fn flat_key(map: &Map<String, Value>) -> Option<String> {
    FLAT_KEYS
        .iter()
        .find_map(|key| map.get(*key))
        .map(coerce)
}

/// First non-empty string `text` field, in document order.
fn find_text_field(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.iter().find_map(|(key, value)| match value {
            Value::String(text) if key == "text" && !text.is_empty() => Some(text.clone()),
            other => find_text_field(other),
        }),
        Value::Array(items) => items.iter().find_map(find_text_field),
        _ => None,
    }
}

fn find_text_pattern(haystack: &str) -> Option<String> {
    let captures = TEXT_PATTERN.captures(haystack)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
