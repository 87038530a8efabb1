pub mod registry;
pub mod services;

pub use registry::Registry;
pub use services::*;
