//! Decoding of Firestore REST documents into plain JSON records.
//!
//! Firestore wraps every field in a typed envelope (`{"stringValue": "x"}`,
//! `{"integerValue": "42"}`, ...). The dashboard only wants the plain values,
//! with the document identifier merged in under `id`.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A document as returned by the Firestore REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Full resource name, e.g. `projects/p/databases/(default)/documents/orders/abc`.
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl RawDocument {
    /// Database-assigned identifier: the last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Decodes the fields and merges the identifier under `id`.
    ///
    /// A stored field called `id` is overwritten.
    pub fn into_record(self) -> Map<String, Value> {
        let id = self.id().to_string();
        let mut record = decode_fields(&self.fields);
        record.insert("id".to_string(), Value::String(id));
        record
    }
}

/// One page of a `documents.list` call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<RawDocument>,
    pub next_page_token: Option<String>,
}

/// Decodes a Firestore `fields` map.
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decodes a single typed Firestore value.
pub fn decode_value(value: &Value) -> Value {
    let Some(envelope) = value.as_object() else {
        tracing::debug!("Unexpected Firestore value shape: {}", value);
        return Value::Null;
    };

    if let Some(v) = envelope.get("stringValue") {
        return v.clone();
    }
    if let Some(v) = envelope.get("integerValue") {
        return decode_integer(v);
    }
    if let Some(v) = envelope.get("doubleValue") {
        return v.clone();
    }
    if let Some(v) = envelope.get("booleanValue") {
        return v.clone();
    }
    if envelope.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(v) = envelope.get("timestampValue") {
        return v.clone();
    }
    if let Some(v) = envelope.get("referenceValue") {
        return v.clone();
    }
    if let Some(v) = envelope.get("bytesValue") {
        return v.clone();
    }
    if let Some(v) = envelope.get("geoPointValue") {
        let coordinate = |key: &str| v.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        return serde_json::json!({
            "latitude": coordinate("latitude"),
            "longitude": coordinate("longitude"),
        });
    }
    if let Some(v) = envelope.get("arrayValue") {
        let values = v
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(v) = envelope.get("mapValue") {
        let fields = v
            .get("fields")
            .and_then(Value::as_object)
            .map(decode_fields)
            .unwrap_or_default();
        return Value::Object(fields);
    }

    tracing::debug!("Unknown Firestore value type: {:?}", envelope.keys().collect::<Vec<_>>());
    Value::Null
}

// int64 travels as a decimal string
fn decode_integer(raw: &Value) -> Value {
    match raw {
        Value::String(s) => s
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| raw.clone()),
        Value::Number(_) => raw.clone(),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_values() {
        assert_eq!(decode_value(&json!({"stringValue": "pallet"})), json!("pallet"));
        assert_eq!(decode_value(&json!({"integerValue": "42"})), json!(42));
        assert_eq!(decode_value(&json!({"doubleValue": 12.5})), json!(12.5));
        assert_eq!(decode_value(&json!({"doubleValue": "NaN"})), json!("NaN"));
        assert_eq!(decode_value(&json!({"booleanValue": true})), json!(true));
        assert_eq!(decode_value(&json!({"nullValue": null})), Value::Null);
        assert_eq!(
            decode_value(&json!({"timestampValue": "2026-03-01T10:00:00Z"})),
            json!("2026-03-01T10:00:00Z")
        );
    }

    #[test]
    fn test_integer_out_of_range_kept_as_string() {
        assert_eq!(
            decode_value(&json!({"integerValue": "99999999999999999999"})),
            json!("99999999999999999999")
        );
    }

    #[test]
    fn test_nested_values() {
        let raw = json!({
            "mapValue": {
                "fields": {
                    "sku": {"stringValue": "BOX-1"},
                    "dims": {"arrayValue": {"values": [
                        {"integerValue": "10"},
                        {"integerValue": "20"}
                    ]}},
                    "depot": {"geoPointValue": {"latitude": 52.1}}
                }
            }
        });

        assert_eq!(
            decode_value(&raw),
            json!({
                "sku": "BOX-1",
                "dims": [10, 20],
                "depot": {"latitude": 52.1, "longitude": 0.0}
            })
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(decode_value(&json!({"arrayValue": {}})), json!([]));
        assert_eq!(decode_value(&json!({"mapValue": {}})), json!({}));
    }

    #[test]
    fn test_unknown_shapes_decode_to_null() {
        assert_eq!(decode_value(&json!({"vectorValue": {}})), Value::Null);
        assert_eq!(decode_value(&json!("bare")), Value::Null);
    }

    #[test]
    fn test_document_id_merged_into_record() {
        let doc: RawDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/orders/ord-1",
            "fields": {
                "id": {"stringValue": "stale"},
                "status": {"stringValue": "shipped"}
            },
            "createTime": "2026-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.id(), "ord-1");
        let record = doc.into_record();
        assert_eq!(record["id"], "ord-1");
        assert_eq!(record["status"], "shipped");
    }

    #[test]
    fn test_empty_list_response() {
        let page: ListDocumentsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
