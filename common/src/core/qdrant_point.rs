use std::collections::HashMap;

use qdrant_client::qdrant::{self, point_id::PointIdOptions, value::Kind, PointId};
use serde_json::{Map, Number, Value as JsonValue};

/// Identifier of a stored point, in the two forms the vector store serves:
/// an unsigned integer or a UUID-like string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointIdentifier {
    Uint(u64),
    Uuid(String),
}

impl std::fmt::Display for PointIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointIdentifier::Uint(number) => write!(f, "{}", number),
            PointIdentifier::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

impl From<&PointIdentifier> for PointId {
    fn from(id: &PointIdentifier) -> Self {
        match id {
            PointIdentifier::Uint(number) => (*number).into(),
            PointIdentifier::Uuid(uuid) => uuid.clone().into(),
        }
    }
}

/// Extracts a [`PointIdentifier`] from a wire point id, `None` when the id
/// carries no value.
pub fn identifier_from_point_id(point_id: &PointId) -> Option<PointIdentifier> {
    match &point_id.point_id_options {
        Some(PointIdOptions::Num(number)) => Some(PointIdentifier::Uint(*number)),
        Some(PointIdOptions::Uuid(uuid)) => Some(PointIdentifier::Uuid(uuid.clone())),
        None => None,
    }
}

/// Converts a wire payload into a JSON map, so the rest of the code can
/// inspect payloads without depending on the store's value types.
pub fn json_map_from_payload(payload: &HashMap<String, qdrant::Value>) -> Map<String, JsonValue> {
    payload
        .iter()
        .map(|(key, value)| (key.clone(), json_value_from_qdrant(value)))
        .collect()
}

/// Converts a JSON map back into a wire payload. Together with
/// [`json_map_from_payload`] this round-trips every value shape the store
/// supports, so a payload read during a scan can be written back untouched.
pub fn payload_from_json_map(map: &Map<String, JsonValue>) -> HashMap<String, qdrant::Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), qdrant_value_from_json(value)))
        .collect()
}

pub fn json_value_from_qdrant(value: &qdrant::Value) -> JsonValue {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Kind::IntegerValue(i)) => JsonValue::Number((*i).into()),
        // Non-finite doubles have no JSON representation
        Some(Kind::DoubleValue(d)) => Number::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.iter().map(json_value_from_qdrant).collect())
        }
        Some(Kind::StructValue(fields)) => JsonValue::Object(
            fields
                .fields
                .iter()
                .map(|(key, value)| (key.clone(), json_value_from_qdrant(value)))
                .collect(),
        ),
    }
}

pub fn qdrant_value_from_json(value: &JsonValue) -> qdrant::Value {
    let kind = match value {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(*b),
        JsonValue::Number(number) => match number.as_i64() {
            Some(integer) => Kind::IntegerValue(integer),
            None => Kind::DoubleValue(number.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Kind::StringValue(s.clone()),
        JsonValue::Array(values) => Kind::ListValue(qdrant::ListValue {
            values: values.iter().map(qdrant_value_from_json).collect(),
        }),
        JsonValue::Object(map) => Kind::StructValue(qdrant::Struct {
            fields: map
                .iter()
                .map(|(key, value)| (key.clone(), qdrant_value_from_json(value)))
                .collect(),
        }),
    };
    qdrant::Value { kind: Some(kind) }
}
