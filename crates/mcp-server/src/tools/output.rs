//! Output normalization: every tool result becomes one canonical text payload.
//!
//! Results arrive in three shapes (plain text, JSON values, typed response
//! records) plus an opaque fallback. [`normalize`] runs a fixed, ordered list of
//! converters and stops at the first one that claims the value. A converter
//! failure never escapes: the caller gets a JSON error envelope instead.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use servicenow_protocol::serialize_json_pretty;

/// A typed response object that can be viewed as a JSON mapping.
pub trait Record: Send {
    fn to_mapping(&self) -> serde_json::Result<Value>;

    fn type_name(&self) -> &'static str;
}

impl<T> Record for T
where
    T: Serialize + Send + 'static,
{
    fn to_mapping(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Raw value returned by a tool implementation, before normalization.
pub enum RawOutput {
    Text(String),
    Json(Value),
    Record(Box<dyn Record>),
    Other(Box<dyn fmt::Debug + Send>),
}

impl RawOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn json(value: Value) -> Self {
        Self::Json(value)
    }

    pub fn record<R: Record + 'static>(record: R) -> Self {
        Self::Record(Box::new(record))
    }

    pub fn other<D: fmt::Debug + Send + 'static>(value: D) -> Self {
        Self::Other(Box::new(value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Json(_) => "json",
            Self::Record(_) => "record",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Debug for RawOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Record(record) => f.debug_tuple("Record").field(&record.type_name()).finish(),
            Self::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}

type Converter = fn(&RawOutput) -> Option<anyhow::Result<String>>;

/// Tried in order; the first converter returning `Some` decides the output.
const CONVERTERS: &[(&str, Converter)] = &[
    ("text", from_text),
    ("mapping", from_mapping),
    ("record", from_record),
    ("debug", from_debug),
];

fn from_text(raw: &RawOutput) -> Option<anyhow::Result<String>> {
    let RawOutput::Text(text) = raw else {
        return None;
    };
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) if integers_are_exact(text) => Some(serialize_json_pretty(&parsed)),
        _ => Some(Ok(text.clone())),
    }
}

/// False when an integer literal in `text` does not fit `i64`/`u64`; serde_json
/// would read it as `f64` and re-render a different number.
fn integers_are_exact(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match byte {
            b'"' => {
                in_string = true;
                i += 1;
            }
            b'-' | b'0'..=b'9' => {
                let start = i;
                while i < bytes.len()
                    && matches!(bytes[i], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
                {
                    i += 1;
                }
                let token = &text[start..i];
                let integral = !token.contains(['.', 'e', 'E']);
                if integral && token.parse::<i64>().is_err() && token.parse::<u64>().is_err() {
                    return false;
                }
            }
            _ => i += 1,
        }
    }
    true
}

fn from_mapping(raw: &RawOutput) -> Option<anyhow::Result<String>> {
    let RawOutput::Json(value) = raw else {
        return None;
    };
    Some(serialize_json_pretty(value))
}

fn from_record(raw: &RawOutput) -> Option<anyhow::Result<String>> {
    let RawOutput::Record(record) = raw else {
        return None;
    };
    Some(
        record
            .to_mapping()
            .map_err(anyhow::Error::from)
            .and_then(|mapping| serialize_json_pretty(&mapping)),
    )
}

fn from_debug(raw: &RawOutput) -> Option<anyhow::Result<String>> {
    let text = match raw {
        RawOutput::Other(value) => format!("{value:?}"),
        other => format!("{other:?}"),
    };
    Some(Ok(text))
}

/// Canonical text for `raw`, produced by the first matching converter.
pub fn normalize(tool: &str, raw: &RawOutput) -> String {
    for (label, convert) in CONVERTERS {
        match convert(raw) {
            None => continue,
            Some(Ok(text)) => {
                if *label == "debug" {
                    log::warn!(
                        "Could not serialize result for tool '{tool}' to JSON, falling back to debug rendering. Kind: {}",
                        raw.kind()
                    );
                }
                return text;
            }
            Some(Err(err)) => {
                log::error!("Error during serialization for tool '{tool}' ({label}): {err:#}");
                return serialization_failure(tool, &format!("{err:#}"));
            }
        }
    }
    serialization_failure(tool, "no converter accepted the result")
}

fn serialization_failure(tool: &str, details: &str) -> String {
    let details = if details.trim().is_empty() {
        "unknown serialization error"
    } else {
        details
    };
    let envelope = serde_json::json!({
        "error": format!("Serialization failed for tool {tool}"),
        "details": details,
    });
    serialize_json_pretty(&envelope).unwrap_or_else(|_| {
        format!("{{\"error\": \"Serialization failed for tool {tool}\", \"details\": {details:?}}}")
    })
}
