pub mod errors;
pub mod msgs;
pub mod params;
pub mod types;

pub use errors::*;
pub use msgs::*;
pub use params::*;
pub use types::*;
