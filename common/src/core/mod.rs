pub mod fastembed_embedding;
pub mod point_payload;
pub mod qdrant_point;
