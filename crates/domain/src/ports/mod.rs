pub mod messaging;
pub mod unit_of_work;

pub use messaging::*;
pub use unit_of_work::*;
