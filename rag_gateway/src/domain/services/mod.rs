pub mod node_retriever;
pub mod query_engine;
