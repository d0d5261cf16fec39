//! Strict field access over model replies
//!
//! Models wrap JSON in code fences or prose. `extract_object` finds the
//! object; the typed getters turn shape problems into [`DecodeError`]s.

use serde_json::{Map, Value};

use crate::error::DecodeError;

pub type Object = Map<String, Value>;

/// Locate and parse the JSON object in a model reply.
///
/// Accepts a ```` ```json ```` fenced block, otherwise the span from the
/// first `{` to the last `}`.
pub fn extract_object(text: &str) -> Result<Object, DecodeError> {
    let trimmed = text.trim();

    let candidate = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim())
    } else {
        match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => return Err(DecodeError::NoJson),
        }
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DecodeError::NoJson),
        Err(e) => Err(DecodeError::Malformed(e.to_string())),
    }
}

fn present<'a>(obj: &'a Object, field: &'static str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

pub fn required<'a>(obj: &'a Object, field: &'static str) -> Result<&'a Value, DecodeError> {
    present(obj, field).ok_or(DecodeError::MissingField(field))
}

pub fn required_str<'a>(obj: &'a Object, field: &'static str) -> Result<&'a str, DecodeError> {
    required(obj, field)?
        .as_str()
        .ok_or(DecodeError::WrongType { field, expected: "string" })
}

pub fn required_bool(obj: &Object, field: &'static str) -> Result<bool, DecodeError> {
    required(obj, field)?
        .as_bool()
        .ok_or(DecodeError::WrongType { field, expected: "boolean" })
}

pub fn required_i64(obj: &Object, field: &'static str) -> Result<i64, DecodeError> {
    required(obj, field)?
        .as_i64()
        .ok_or(DecodeError::WrongType { field, expected: "integer" })
}

/// A number in [0, 1]
pub fn required_confidence(obj: &Object, field: &'static str) -> Result<f64, DecodeError> {
    let value = required(obj, field)?
        .as_f64()
        .ok_or(DecodeError::WrongType { field, expected: "number" })?;

    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DecodeError::ConfidenceOutOfRange(value))
    }
}

/// Nullable string; `None` for null, missing or blank
pub fn optional_str<'a>(obj: &'a Object, field: &'static str) -> Result<Option<&'a str>, DecodeError> {
    match present(obj, field) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .ok_or(DecodeError::WrongType { field, expected: "string or null" }),
    }
}

pub fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, DecodeError> {
    let wrong = DecodeError::WrongType { field, expected: "array of strings" };
    value
        .as_array()
        .ok_or_else(|| wrong.clone())?
        .iter()
        .map(|item| item.as_str().map(String::from).ok_or_else(|| wrong.clone()))
        .collect()
}

/// Missing or null lists decode as empty
pub fn optional_string_list(obj: &Object, field: &'static str) -> Result<Vec<String>, DecodeError> {
    match present(obj, field) {
        None => Ok(Vec::new()),
        Some(v) => string_list(v, field),
    }
}
