//! # Keeper Container
//!
//! Configuration, the keeper dependency graph and keeper construction.
//!
//! - Partitions allocated once, then sealed
//! - Keepers built in dependency order; unknown dependencies and cycles
//!   abort start-up
//! - Cross-keeper calls go through adapters implementing module ports

pub mod config;
pub mod graph;
pub mod keepers;

pub use config::*;
pub use graph::*;
pub use keepers::*;
