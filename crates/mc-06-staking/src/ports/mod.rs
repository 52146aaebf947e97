pub mod expected;

pub use expected::*;
