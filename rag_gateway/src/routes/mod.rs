pub mod ask;
pub mod health_check;

pub use ask::*;
pub use health_check::*;
