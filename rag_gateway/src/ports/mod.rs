pub mod completion_port;
pub mod point_search_port;
pub mod query_encoder_port;
