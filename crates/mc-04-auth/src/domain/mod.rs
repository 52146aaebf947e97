pub mod account;
pub mod errors;
pub mod params;

pub use account::*;
pub use errors::*;
pub use params::*;
