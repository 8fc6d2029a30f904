use common::core::qdrant_point::PointIdentifier;
use serde_json::{Map, Value as JsonValue};

/// A content node fetched from the vector store for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedNode {
    pub id: PointIdentifier,
    /// Text extracted from the payload, empty when nothing was extractable.
    pub text: String,
    pub payload: Map<String, JsonValue>,
}
