pub mod stored_point;
