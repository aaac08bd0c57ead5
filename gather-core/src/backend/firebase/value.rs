//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). Documents in
//! the rest of the crate are plain JSON, so everything crossing the wire goes
//! through [`encode_fields`] and [`decode_fields`].

use serde_json::{Map, Value, json};

use crate::backend::Fields;
use crate::error::{GatherError, GatherResult};

pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => json!({ "integerValue": i.to_string() }),
            (None, Some(u)) => json!({ "integerValue": u.to_string() }),
            _ => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect();
    Value::Object(encoded)
}

pub fn decode(value: &Value) -> GatherResult<Value> {
    let Some(object) = value.as_object() else {
        return Err(bad_value(value));
    };
    let Some((kind, inner)) = object.iter().next() else {
        return Err(bad_value(value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().map_err(|_| bad_value(value))?,
                Value::Number(n) => n.as_i64().ok_or_else(|| bad_value(value))?,
                _ => return Err(bad_value(value)),
            };
            Ok(Value::from(parsed))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and infinities arrive as strings.
            Value::String(_) => Ok(Value::Null),
            _ => Err(bad_value(value)),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode).collect::<GatherResult<Vec<_>>>()?,
                None => Vec::new(),
            };
            Ok(Value::Array(items))
        }
        "mapValue" => {
            let fields = match inner.get("fields").and_then(Value::as_object) {
                Some(fields) => decode_fields(fields)?,
                None => Fields::new(),
            };
            Ok(Value::Object(fields))
        }
        _ => Err(bad_value(value)),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> GatherResult<Fields> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode(value)?)))
        .collect()
}

fn bad_value(value: &Value) -> GatherError {
    GatherError::Serialization(format!("unrecognized Firestore value: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_event_document() {
        let fields = json!({
            "name": "Meetup",
            "venue": null,
            "attendees": 3,
            "tags": ["a"],
        });
        let encoded = encode_fields(fields.as_object().unwrap());

        assert_eq!(encoded["name"], json!({"stringValue": "Meetup"}));
        assert_eq!(encoded["venue"], json!({"nullValue": null}));
        assert_eq!(encoded["attendees"], json!({"integerValue": "3"}));
        assert_eq!(
            encoded["tags"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}]}})
        );
    }

    #[test]
    fn decodes_rest_document_fields() {
        let raw = json!({
            "name": {"stringValue": "Meetup"},
            "createdAt": {"timestampValue": "2025-03-20T15:00:00Z"},
            "count": {"integerValue": "7"},
            "ratio": {"doubleValue": 0.5},
            "flag": {"booleanValue": true},
            "empty": {"arrayValue": {}},
            "nested": {"mapValue": {"fields": {"x": {"nullValue": null}}}},
        });
        let decoded = decode_fields(raw.as_object().unwrap()).unwrap();

        assert_eq!(
            Value::Object(decoded),
            json!({
                "name": "Meetup",
                "createdAt": "2025-03-20T15:00:00Z",
                "count": 7,
                "ratio": 0.5,
                "flag": true,
                "empty": [],
                "nested": {"x": null},
            })
        );
    }

    #[test]
    fn rejects_unknown_value_kinds() {
        assert!(decode(&json!({"mysteryValue": 1})).is_err());
        assert!(decode(&json!("bare")).is_err());
    }
}
