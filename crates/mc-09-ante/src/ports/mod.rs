pub mod keepers;

pub use keepers::*;
