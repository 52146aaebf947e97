pub mod config;
pub mod errors;
pub mod gas_price;
pub mod tx;

pub use config::*;
pub use errors::*;
pub use gas_price::*;
pub use tx::*;
