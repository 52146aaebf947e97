pub mod errors;
pub mod msgs;
pub mod params;

pub use errors::*;
pub use msgs::*;
pub use params::*;
