pub mod deliver;

pub use deliver::*;
