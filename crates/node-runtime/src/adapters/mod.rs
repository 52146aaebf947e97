//! # Keeper Port Adapters
//!
//! Each module crate declares the narrow ports it needs from other keepers
//! (`ports/` in the module crate). The runtime implements those ports here
//! over the concrete keepers, so no module crate depends on another
//! module's keeper type.
//!
//! ```text
//! ┌─────────────┐  mc_05_bank::AccountKeeper     ┌────────────┐
//! │  BankKeeper │ ─────────────────────────────► │            │
//! └─────────────┘                                │            │
//! ┌─────────────┐  mc_06_staking::AccountKeeper  │ AuthAdapter│──► AuthKeeper
//! │StakingKeeper│ ─────────────────────────────► │            │
//! └──────┬──────┘                                │            │
//!        │        mc_09_ante::AccountKeeper      │            │
//!        │     ┌───────────────────────────────► └────────────┘
//!        │     │
//!        │  AnteHandler
//!        │     │  mc_09_ante::BankKeeper          ┌────────────┐
//!        │     └────────────────────────────────► │            │
//!        │        mc_06_staking::BankKeeper       │ BankAdapter│──► BankKeeper
//!        └──────────────────────────────────────► └────────────┘
//! ```

pub mod accounts;
pub mod bank;
pub mod genesis_tx;
pub mod staking;

pub use accounts::*;
pub use bank::*;
pub use genesis_tx::*;
pub use staking::*;
