//! # mc-08-genutil
//!
//! Genesis transactions: signed `MsgCreateValidator` transactions collected
//! before launch and delivered through the normal admission pipeline while
//! the chain initialises.
//!
//! Runs last in the genesis order so accounts, balances and staking
//! parameters are in place. When any genesis transaction was delivered the
//! module reports the resulting validator set; a failing genesis
//! transaction aborts chain initialisation.

pub mod domain;
pub mod genesis;
pub mod module;
pub mod ports;

pub use domain::*;
pub use genesis::*;
pub use module::*;
pub use ports::*;
