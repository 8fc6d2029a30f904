use common::core::point_payload::{first_string_field, node_metadata};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::retrieved_node::RetrievedNode;

/// Keys that may hold each source field, tried in order, first in the node
/// metadata then in the top-level payload.
const TITLE_KEYS: [&str; 4] = ["title", "file_name", "source", "document_title"];
const AUTHOR_KEYS: [&str; 2] = ["author", "creator"];
const DATE_KEYS: [&str; 3] = ["date", "created_at", "creation_date"];
const DOWNLOAD_URL_KEYS: [&str; 3] = ["download_url", "url", "file_path"];

/// What the API reports about one source backing an answer.
///
/// Extraction is opportunistic: a missing field serializes as `null`, and the
/// title degrades to `doc_<identifier>` when nothing usable is found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceDescriptor {
    pub title: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub download_url: Option<String>,
}

impl SourceDescriptor {
    pub fn from_node(node: &RetrievedNode) -> Self {
        let metadata = node_metadata(&node.payload);

        let title = lookup(&metadata, &node.payload, &TITLE_KEYS)
            .unwrap_or_else(|| format!("doc_{}", node.id));

        Self {
            title,
            author: lookup(&metadata, &node.payload, &AUTHOR_KEYS),
            date: lookup(&metadata, &node.payload, &DATE_KEYS),
            download_url: lookup(&metadata, &node.payload, &DOWNLOAD_URL_KEYS),
        }
    }
}

/// First match in the node metadata, then in the raw payload.
fn lookup(
    metadata: &Option<Map<String, JsonValue>>,
    payload: &Map<String, JsonValue>,
    keys: &[&str],
) -> Option<String> {
    metadata
        .as_ref()
        .and_then(|metadata| first_string_field(metadata, keys))
        .or_else(|| first_string_field(payload, keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::core::qdrant_point::PointIdentifier;
    use serde_json::json;

    fn node(id: PointIdentifier, payload: JsonValue) -> RetrievedNode {
        let JsonValue::Object(payload) = payload else {
            panic!("test payload must be a JSON object");
        };
        RetrievedNode {
            id,
            text: String::new(),
            payload,
        }
    }

    #[test]
    fn on_a_node_with_metadata_it_reads_the_source_fields_from_it() {
        let node = node(
            PointIdentifier::Uint(1),
            json!({
                "_node_content": r#"{"text": "t", "metadata": {"title": "Municipal charter", "author": "City council", "date": "2021-06-03", "url": "https://example.org/charter.pdf"}}"#,
            }),
        );

        let source = SourceDescriptor::from_node(&node);

        assert_eq!(source.title, "Municipal charter");
        assert_eq!(source.author, Some("City council".to_string()));
        assert_eq!(source.date, Some("2021-06-03".to_string()));
        assert_eq!(
            source.download_url,
            Some("https://example.org/charter.pdf".to_string())
        );
    }

    #[test]
    fn on_a_node_without_metadata_it_falls_back_to_the_payload_fields() {
        let node = node(
            PointIdentifier::Uint(2),
            json!({
                "file_name": "report-2020.pdf",
                "creator": "The archives",
            }),
        );

        let source = SourceDescriptor::from_node(&node);

        assert_eq!(source.title, "report-2020.pdf");
        assert_eq!(source.author, Some("The archives".to_string()));
        assert_eq!(source.date, None);
    }

    #[test]
    fn on_a_field_present_in_both_it_prefers_the_node_metadata() {
        let node = node(
            PointIdentifier::Uint(3),
            json!({
                "_node_content": r#"{"metadata": {"title": "From the node"}}"#,
                "title": "From the payload",
            }),
        );

        assert_eq!(SourceDescriptor::from_node(&node).title, "From the node");
    }

    #[test]
    fn on_a_node_with_no_usable_title_it_generates_one_from_the_identifier() {
        let node = node(PointIdentifier::Uint(42), json!({"count": 3}));
        assert_eq!(SourceDescriptor::from_node(&node).title, "doc_42");

        let node = node(
            PointIdentifier::Uuid("205f5a1e-9b43-4cb6-b735-3dbb9c62a7fd".to_string()),
            json!({}),
        );
        assert_eq!(
            SourceDescriptor::from_node(&node).title,
            "doc_205f5a1e-9b43-4cb6-b735-3dbb9c62a7fd"
        );
    }

    #[test]
    fn on_serialization_it_keeps_the_missing_fields_as_nulls() {
        let node = node(PointIdentifier::Uint(7), json!({"title": "Only a title"}));
        let serialized = serde_json::to_value(SourceDescriptor::from_node(&node)).unwrap();

        assert_eq!(
            serialized,
            json!({
                "title": "Only a title",
                "author": null,
                "date": null,
                "download_url": null,
            })
        );
    }
}
