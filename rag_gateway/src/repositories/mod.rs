pub mod completion_openai_like_repository;
pub mod point_qdrant_repository;
