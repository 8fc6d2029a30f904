pub mod retrieved_node;
pub mod source_descriptor;
