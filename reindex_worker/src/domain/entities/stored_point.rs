use common::core::fastembed_embedding::Embeddings;
use common::core::qdrant_point::PointIdentifier;
use serde_json::{Map, Value as JsonValue};

/// The shapes a scanned point can arrive in, depending on the store client
/// and collection history. [`RawPointRecord::normalize`] is the single
/// conversion to the canonical [`StoredPoint`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointRecord {
    /// A typed client point: identifier and payload already separated.
    Typed {
        id: Option<PointIdentifier>,
        payload: Map<String, JsonValue>,
    },
    /// A mapping-like record: the identifier may live under `id`, `point_id`
    /// or `_id`, the payload under an optional `payload` object.
    Record(JsonValue),
    /// A sequence wrapping the actual record as its first element.
    Nested(Vec<RawPointRecord>),
}

/// A scanned point in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub id: Option<PointIdentifier>,
    pub payload: Map<String, JsonValue>,
}

impl StoredPoint {
    /// The degraded form for a record nothing could be read from.
    pub fn unusable() -> Self {
        Self {
            id: None,
            payload: Map::new(),
        }
    }
}

/// Keys a mapping-like record may store its identifier under, tried in order.
const ID_KEYS: [&str; 3] = ["id", "point_id", "_id"];

impl RawPointRecord {
    /// Canonical conversion to a [`StoredPoint`].
    ///
    /// Never fails: a record no rule applies to normalizes to a point with
    /// no identifier and an empty payload, which the selection step then
    /// skips for lack of text.
    pub fn normalize(self) -> StoredPoint {
        match self {
            RawPointRecord::Typed { id, payload } => StoredPoint { id, payload },
            RawPointRecord::Record(value) => normalize_record(value),
            RawPointRecord::Nested(records) => match records.into_iter().next() {
                Some(first) => first.normalize(),
                None => StoredPoint::unusable(),
            },
        }
    }
}

fn normalize_record(value: JsonValue) -> StoredPoint {
    let JsonValue::Object(mut record) = value else {
        return StoredPoint::unusable();
    };

    let id = ID_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(identifier_from_json));
    let payload = match record.remove("payload") {
        Some(JsonValue::Object(payload)) => payload,
        _ => Map::new(),
    };

    StoredPoint { id, payload }
}

fn identifier_from_json(value: &JsonValue) -> Option<PointIdentifier> {
    match value {
        JsonValue::Number(number) => number.as_u64().map(PointIdentifier::Uint),
        JsonValue::String(uuid) if !uuid.is_empty() => Some(PointIdentifier::Uuid(uuid.clone())),
        _ => None,
    }
}

/// A point selected for reindexing: the text to embed, plus the payload that
/// must be written back untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEmbedding {
    pub id: Option<PointIdentifier>,
    pub text: String,
    pub payload: Map<String, JsonValue>,
}

/// A fully prepared upsert: identifier, freshly computed vector and the
/// original payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PointUpdate {
    pub id: Option<PointIdentifier>,
    pub vector: Embeddings,
    pub payload: Map<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn a_typed_record_normalizes_to_itself() {
        let payload = object(json!({"text": "some text"}));
        let record = RawPointRecord::Typed {
            id: Some(PointIdentifier::Uint(3)),
            payload: payload.clone(),
        };

        let point = record.normalize();

        assert_eq!(point.id, Some(PointIdentifier::Uint(3)));
        assert_eq!(point.payload, payload);
    }

    #[test]
    fn a_mapping_record_finds_the_identifier_under_its_key_variants() {
        for key in ["id", "point_id", "_id"] {
            let record = RawPointRecord::Record(json!({key: 7, "payload": {"a": 1}}));
            let point = record.normalize();
            assert_eq!(point.id, Some(PointIdentifier::Uint(7)), "key: {}", key);
            assert_eq!(point.payload, object(json!({"a": 1})));
        }
    }

    #[test]
    fn a_mapping_record_skips_unusable_identifier_variants() {
        // `id` is present but null: the next key variant must be tried
        let record = RawPointRecord::Record(json!({
            "id": null,
            "point_id": "abc-123",
        }));
        assert_eq!(
            record.normalize().id,
            Some(PointIdentifier::Uuid("abc-123".to_string()))
        );
    }

    #[test]
    fn a_mapping_record_without_payload_gets_an_empty_one() {
        let record = RawPointRecord::Record(json!({"id": 1}));
        assert_eq!(record.normalize().payload, Map::new());

        // A non-object payload is unusable as well
        let record = RawPointRecord::Record(json!({"id": 1, "payload": "not an object"}));
        assert_eq!(record.normalize().payload, Map::new());
    }

    #[test]
    fn a_nested_record_normalizes_its_first_element() {
        let record = RawPointRecord::Nested(vec![
            RawPointRecord::Record(json!({"id": 5, "payload": {"text": "first"}})),
            RawPointRecord::Record(json!({"id": 6, "payload": {"text": "second"}})),
        ]);

        let point = record.normalize();

        assert_eq!(point.id, Some(PointIdentifier::Uint(5)));
        assert_eq!(point.payload, object(json!({"text": "first"})));
    }

    #[test]
    fn an_unusable_record_degrades_to_an_empty_point() {
        assert_eq!(
            RawPointRecord::Record(json!("just a string")).normalize(),
            StoredPoint::unusable()
        );
        assert_eq!(
            RawPointRecord::Nested(vec![]).normalize(),
            StoredPoint::unusable()
        );
    }
}
