//! # mc-02-module
//!
//! Execution primitives shared by every module crate.
//!
//! ## Contents
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Context`] | Per-call handle: header, execution mode, gas meter, events, store view |
//! | [`KvStore`] | Gas-metered access to one partition through its [`StoreKey`](mc_01_store::StoreKey) |
//! | [`Tx`] / [`Msg`] | Transaction envelope and sign document |
//! | [`Genesis`], [`BeginBlockHook`], [`EndBlockHook`], [`MessageHandler`], [`QueryHandler`] | Narrow capability traits a module implements selectively |
//! | [`AppModule`] | Descriptor registering one module's capabilities with the manager |
//!
//! A module that lacks a capability says so with [`Hook::Absent`]; a module
//! that must keep its slot in an order without doing work uses
//! [`Hook::NoOp`].

pub mod context;
pub mod errors;
pub mod events;
pub mod gas;
pub mod kv;
pub mod module;
pub mod tx;

pub use context::*;
pub use errors::*;
pub use events::*;
pub use gas::*;
pub use kv::*;
pub use module::*;
pub use tx::*;
