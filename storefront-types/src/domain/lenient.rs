//! Tolerant decoding of convention fields.
//!
//! Stored documents were written by clients without a schema, so a price may
//! be a numeric string and a status may be `null`. These deserializers coerce
//! what they can and fall back to the field default otherwise. They never
//! fail, so one odd document cannot break a listing.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::order::PENDING_STATUS;

/// A number, or a numeric string. Anything else reads as `0.0`.
pub(crate) fn number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    let n = match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(n.filter(|n: &f64| n.is_finite()).unwrap_or_default())
}

/// A string. `null` reads as empty, other scalars as their JSON text.
pub(crate) fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub(crate) fn optional_text<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

/// An order status. `null` reads as pending.
pub(crate) fn status<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => PENDING_STATUS.to_string(),
        other => other.to_string(),
    })
}

/// A boolean, or the strings `"true"`/`"false"`. Anything else is `false`.
pub(crate) fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}
