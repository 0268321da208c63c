//! Type coercion for request fields.
//!
//! Requests arrive as untyped JSON objects. An absent field takes its default;
//! a present field must coerce to the declared type or the caller gets a
//! `FieldCoercion` error naming the field and the value.

use crate::error::{FeatureError, Result};
use crate::features::MovieRequest;
use serde_json::Value;

fn coercion_error(field: &str, value: &Value, expected: &'static str) -> FeatureError {
    FeatureError::FieldCoercion {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Read a floating-point field.
///
/// Accepts JSON numbers, numeric text (surrounding whitespace ignored) and
/// booleans (1.0 / 0.0).
pub fn float_field(request: &MovieRequest, field: &str, default: f64) -> Result<f64> {
    let Some(value) = request.get(field) else {
        return Ok(default);
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| coercion_error(field, value, "a number"))
}

/// Read an integer field.
///
/// Accepts JSON integers, JSON floats (truncated toward zero), integer text
/// and booleans. Text with a fractional part is rejected.
pub fn int_field(request: &MovieRequest, field: &str, default: i64) -> Result<i64> {
    let Some(value) = request.get(field) else {
        return Ok(default);
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_to_i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };

    parsed.ok_or_else(|| coercion_error(field, value, "an integer"))
}

fn truncate_to_i64(v: f64) -> Option<i64> {
    let t = v.trunc();
    // i64::MAX is not exactly representable; the bound is 2^63
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

/// Read a categorical field as text.
///
/// Strings pass through unchanged. Numbers are rendered as their JSON text,
/// booleans as `True` / `False` (the spelling the training data used).
pub fn text_field(request: &MovieRequest, field: &str, default: &str) -> Result<String> {
    match request.get(field) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Bool(b)) => Ok(if *b { "True" } else { "False" }.to_string()),
        Some(v @ Value::Number(_)) => Ok(v.to_string()),
        Some(v) => Err(coercion_error(field, v, "text")),
    }
}

/// Read a person-name field.
///
/// Absent and `null` both mean "no name given".
pub fn person_field<'a>(request: &'a MovieRequest, field: &str) -> Result<Option<&'a str>> {
    match request.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(v) => Err(coercion_error(field, v, "a name")),
    }
}
