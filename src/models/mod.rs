pub mod prediction;
pub mod startup;

pub use prediction::*;
pub use startup::*;
