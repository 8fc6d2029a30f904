use crate::domain::entities::retrieved_node::RetrievedNode;

/// A node paired with its retrieval score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNode {
    pub node: RetrievedNode,
    pub score: f32,
}

/// Read-only retriever over a fixed set of nodes selected upstream.
///
/// The nearest-neighbor search already ranked the nodes, so they are exposed
/// in search order with a uniform score of 1.0.
pub struct FixedNodeRetriever {
    nodes: Vec<RetrievedNode>,
}

impl FixedNodeRetriever {
    pub fn new(nodes: Vec<RetrievedNode>) -> Self {
        Self { nodes }
    }

    pub fn retrieve(&self) -> Vec<ScoredNode> {
        self.nodes
            .iter()
            .cloned()
            .map(|node| ScoredNode { node, score: 1.0 })
            .collect()
    }
}
