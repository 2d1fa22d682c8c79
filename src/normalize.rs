//! Repairs raw inbound records into well-formed [`Snapshot`]s.
//!
//! Nothing here can fail: malformed fields are repaired by substitution,
//! never by raising. Partial telemetry is better than dropped telemetry.

use serde_json::{Map, Value};

use crate::models::Snapshot;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Turn a raw decoded record into a well-formed snapshot.
///
/// `ordinal` is the record's position in its enclosing sequence and is
/// the fallback for a missing `timestamp` or `id`. Known keys are pulled
/// out field by field; the remainder is collected into `data`, with
/// `image` extracted out of it into the dedicated attribute.
pub fn normalize_record(raw: Value, ordinal: usize) -> Snapshot {
    let mut fields = match raw {
        Value::Object(map) => map,
        other => {
            log_warn!("record {ordinal} is not an object ({other}), repairing to defaults");
            Map::new()
        }
    };

    let timestamp = match fields.remove("timestamp") {
        Some(value) if !is_falsy(&value) => value.as_i64().unwrap_or(ordinal as i64),
        _ => {
            log_warn!("record {ordinal} missing timestamp, defaulting to ordinal");
            ordinal as i64
        }
    };

    let id = match fields.remove("id") {
        Some(value) if !is_falsy(&value) => value.as_u64().unwrap_or(ordinal as u64),
        _ => ordinal as u64,
    };

    let mut image = match fields.remove("image") {
        Some(Value::String(payload)) => Some(payload),
        _ => None,
    };

    let mut data = match fields.remove("data") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    // Any keys the record carried outside the known shape belong to `data`.
    for (key, value) in fields {
        data.insert(key, value);
    }

    // `image` never lives inside `data`; pull it out if it ended up there.
    if let Some(Value::String(payload)) = data.remove("image") {
        if image.is_none() {
            image = Some(payload);
        }
    }

    Snapshot {
        id,
        timestamp,
        image,
        data,
    }
}

/// Missing-equivalent values that trigger the ordinal fallback.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_ordinal_and_empty_data() {
        let snapshot = normalize_record(json!({}), 7);
        assert_eq!(snapshot.id, 7);
        assert_eq!(snapshot.timestamp, 7);
        assert!(snapshot.image.is_none());
        assert!(snapshot.data.is_empty());
    }

    #[test]
    fn zero_timestamp_is_treated_as_missing() {
        let snapshot = normalize_record(json!({ "timestamp": 0, "id": 42 }), 3);
        assert_eq!(snapshot.timestamp, 3);
        assert_eq!(snapshot.id, 42);
    }

    #[test]
    fn image_is_extracted_and_remainder_stays_in_data() {
        let snapshot = normalize_record(
            json!({
                "id": 1,
                "timestamp": 1700000000000i64,
                "image": "base64jpeg",
                "distance": 42.5,
                "notes": "clear"
            }),
            0,
        );
        assert_eq!(snapshot.image.as_deref(), Some("base64jpeg"));
        assert_eq!(snapshot.data.get("distance"), Some(&json!(42.5)));
        assert_eq!(snapshot.data.get("notes"), Some(&json!("clear")));
        assert!(snapshot.data.get("image").is_none());
    }

    #[test]
    fn image_nested_in_data_is_pulled_out() {
        let snapshot = normalize_record(
            json!({ "id": 2, "timestamp": 5, "data": { "image": "frame", "distance": 10 } }),
            0,
        );
        assert_eq!(snapshot.image.as_deref(), Some("frame"));
        assert_eq!(snapshot.data.get("distance"), Some(&json!(10)));
    }

    #[test]
    fn non_object_record_is_repaired_to_defaults() {
        let snapshot = normalize_record(json!("garbage"), 4);
        assert_eq!(snapshot.id, 4);
        assert_eq!(snapshot.timestamp, 4);
        assert!(snapshot.data.is_empty());
    }
}
