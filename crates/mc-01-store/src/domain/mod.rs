pub mod cache;
pub mod codec;
pub mod errors;
pub mod keys;
pub mod multistore;
pub mod root;
pub mod snapshot;

pub use cache::*;
pub use codec::*;
pub use errors::*;
pub use keys::*;
pub use multistore::*;
pub use root::*;
pub use snapshot::*;
