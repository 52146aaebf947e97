pub mod errors;
pub mod gentx;

pub use errors::*;
pub use gentx::*;
