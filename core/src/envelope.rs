//! Response envelope normalization.
//!
//! The backend answers either with a bare JSON value or with a wrapper
//! `{ "data": <value>, "count"?: n, "success"?: bool }`, and not consistently
//! across routes. Every successful body passes through `unwrap_data` once so
//! callers never see the difference.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Return `data` when the body is an object carrying a non-null `data`
/// property, otherwise the body itself.
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Parse `body` as JSON, unwrap the envelope, and deserialize the payload.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    serde_json::from_value(unwrap_data(value))
}

/// Human-readable message from a JSON error body: `error` first, then
/// `message`. `None` when the body is not JSON or carries neither.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"].iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}

/// Item count for logging: the envelope's `count`, else the array length.
pub fn item_count(body: &Value) -> Option<u64> {
    body.get("count")
        .and_then(Value::as_u64)
        .or_else(|| unwrap_data(body.clone()).as_array().map(|a| a.len() as u64))
}
