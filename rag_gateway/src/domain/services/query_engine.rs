use crate::domain::services::node_retriever::ScoredNode;

/// Joins the retrieved node texts into the context block of the prompt,
/// skipping nodes nothing could be extracted from.
pub fn assemble_context(nodes: &[ScoredNode]) -> String {
    nodes
        .iter()
        .map(|scored| scored.node.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Question-answering prompt grounding the model on the retrieved context.
pub fn build_qa_prompt(context: &str, query: &str) -> String {
    format!(
        "Context information is below.\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {query}\n\
         Answer: "
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::retrieved_node::RetrievedNode;
    use common::core::qdrant_point::PointIdentifier;
    use serde_json::Map;

    fn scored(id: u64, text: &str) -> ScoredNode {
        ScoredNode {
            node: RetrievedNode {
                id: PointIdentifier::Uint(id),
                text: text.to_string(),
                payload: Map::new(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn it_joins_node_texts_with_a_blank_line_skipping_empty_ones() {
        let nodes = vec![
            scored(1, "First passage."),
            scored(2, ""),
            scored(3, "Second passage."),
        ];
        assert_eq!(
            assemble_context(&nodes),
            "First passage.\n\nSecond passage."
        );
    }

    #[test]
    fn the_prompt_carries_the_context_and_the_query() {
        let prompt = build_qa_prompt("Some context.", "What is this about?");

        assert!(prompt.starts_with("Context information is below.\n"));
        assert!(prompt.contains("\n---------------------\nSome context.\n---------------------\n"));
        assert!(prompt.contains("answer the query.\nQuery: What is this about?\n"));
        assert!(prompt.ends_with("Answer: "));
    }
}
