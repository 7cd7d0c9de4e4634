//! Firestore typed-value codec.
//!
//! The REST API wraps every field in a one-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). Records are
//! converted through plain `serde_json::Value` so the model types only need
//! their ordinary serde derives.

use serde_json::{Map, Number, Value, json};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("unsupported firestore value: {0}")]
    Unsupported(String),
    #[error("invalid integer value: {0}")]
    BadInteger(String),
    #[error("invalid double value")]
    BadDouble,
    #[error("expected a JSON object")]
    NotAnObject,
}

// =============================================================================
// ENCODE
// =============================================================================

/// Wrap a plain JSON value in Firestore's typed representation.
#[must_use]
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode every entry of an object as a document `fields` map.
#[must_use]
pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), encode(v))).collect()
}

/// Serialize a record and encode it as document fields.
///
/// # Errors
///
/// Returns [`ValueError::NotAnObject`] if the record does not serialize to a JSON object.
pub fn record_fields<T: serde::Serialize>(record: &T) -> Result<Map<String, Value>, ValueError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(encode_fields(&map)),
        _ => Err(ValueError::NotAnObject),
    }
}

// =============================================================================
// DECODE
// =============================================================================

/// Unwrap a Firestore typed value into plain JSON.
///
/// Timestamps become RFC 3339 strings; references and bytes stay strings.
///
/// # Errors
///
/// Returns an error for unknown value kinds or malformed numbers.
pub fn decode(value: &Value) -> Result<Value, ValueError> {
    let Some(obj) = value.as_object() else {
        return Err(ValueError::NotAnObject);
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Err(ValueError::Unsupported("empty value".into()));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or(false))),
        "integerValue" => decode_integer(inner),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(ValueError::BadDouble),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            Ok(Value::String(inner.as_str().unwrap_or_default().to_string()))
        }
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            values.iter().map(decode).collect::<Result<Vec<_>, _>>().map(Value::Array)
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            match fields {
                Some(fields) => decode_fields(fields).map(Value::Object),
                None => Ok(Value::Object(Map::new())),
            }
        }
        "geoPointValue" => Ok(inner.clone()),
        other => Err(ValueError::Unsupported(other.to_string())),
    }
}

/// Decode a document `fields` map.
///
/// # Errors
///
/// Propagates the first field that fails to decode.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, ValueError> {
    fields
        .iter()
        .map(|(k, v)| decode(v).map(|decoded| (k.clone(), decoded)))
        .collect()
}

/// Integers travel as decimal strings (int64 overflows JSON doubles).
fn decode_integer(inner: &Value) -> Result<Value, ValueError> {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| ValueError::BadInteger(s.clone())),
        Value::Number(n) if n.is_i64() => Ok(Value::Number(n.clone())),
        other => Err(ValueError::BadInteger(other.to_string())),
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
