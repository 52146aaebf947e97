//! # Shared Types Crate
//!
//! Domain primitives used across the whole application core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses a module boundary
//!   (addresses, coins, events, validator updates) is defined here.
//! - **Deterministic by Construction**: Collections are sorted (`Coins`) or
//!   ordered (`BTreeMap`); there is no floating point and no clock access.
//! - **Two Error Tiers**: [`AppError`] is either [`FatalError`] (the process
//!   must stop before serving another block) or [`TxError`] (one transaction
//!   is rejected, execution continues).

pub mod coins;
pub mod entities;
pub mod errors;
pub mod events;

pub use coins::*;
pub use entities::*;
pub use errors::*;
pub use events::*;
