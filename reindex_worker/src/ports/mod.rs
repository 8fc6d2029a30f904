pub mod embeddings_port;
pub mod point_store_port;
