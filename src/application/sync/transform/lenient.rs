//! Tolerant field decoding for upstream payloads.
//!
//! Upstream numbers arrive as JSON numbers, numeric strings or null
//! depending on the endpoint. These helpers accept all three and reject
//! anything else, so a wrong-typed field makes the record malformed
//! instead of silently becoming zero.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// Values above this are taken to be epoch milliseconds.
const MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// Numeric value of a JSON number or numeric string.
#[must_use]
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Epoch seconds (or milliseconds) floored to a whole-second UTC time.
#[must_use]
pub fn timestamp(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let secs = if raw >= MILLIS_THRESHOLD {
        raw / 1000.0
    } else {
        raw
    };
    Utc.timestamp_opt(secs.floor() as i64, 0).single()
}

/// `Option<f64>` from a number, numeric string, empty string or null.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => number(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number, got {value}"))),
    }
}

/// `Option<String>` from a string, a number or null.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}

/// Free text: strings pass through, structured values are kept as JSON.
#[must_use]
pub fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Round a derived count once, at the point of derivation.
#[must_use]
pub fn count(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}
