pub mod core;
pub mod helper;
pub mod telemetry;
