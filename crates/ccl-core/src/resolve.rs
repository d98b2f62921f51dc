//! Resolve-or-default helpers.
//!
//! Absent data is never an error in the merge: every lookup funnels through
//! these helpers and resolves to a trimmed string, or the fallback.

use serde_json::Value;

/// Trimmed `value`, or `fallback` when the value is absent or blank.
pub fn resolve(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Scalar JSON value rendered as a string.
///
/// Strings are trimmed, numbers and booleans are formatted. Null, arrays and
/// objects resolve to `fallback`.
pub fn resolve_value(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) => resolve(Some(s), fallback),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => fallback.to_string(),
    }
}
