//! # Node Runtime Library
//!
//! Assembles the module crates into one application. The `main.rs` binary
//! drives it as a single-node devnet.
//!
//! ## Layout
//!
//! - `container/` - Configuration, store partitions and keeper construction
//! - `registry/` - Module manager and lifecycle orders
//! - `wiring/` - Message and query routers
//! - `adapters/` - Keeper ports implemented over concrete keepers
//! - `app/` - Block lifecycle controller and transaction runner
//! - `genesis/` - Genesis document and builder

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_lines)]

pub mod adapters;
pub mod app;
pub mod container;
pub mod genesis;
pub mod registry;
pub mod wiring;

pub use app::{AppPhase, ChainApp, TxResult};
pub use container::{AppConfig, KeeperContainer};
pub use registry::{GenesisState, ModuleManager};
