//! # mc-05-bank
//!
//! Bank keeper: balances, total supply and every token movement.
//!
//! ## Keeper Operations
//!
//! | Operation | Precondition |
//! |-----------|--------------|
//! | `send_coins` | sender covers every denom |
//! | `send_coins_from_module_to_account` | recipient not blocked |
//! | `delegate_coins_from_account_to_module` | module holds `Staking` |
//! | `mint_coins` | module holds `Minter` |
//! | `burn_coins` | module holds `Burner` and covers the amount |
//!
//! Preconditions are checked before any write and the writes of one call run
//! in a cache branch, so a failed call leaves balances and supply untouched
//! and emits no events.
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `0x00 ‖ denom` | total supply (`u128`) |
//! | `0x02 ‖ address ‖ denom` | balance (`u128`) |

pub mod domain;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod module;
pub mod ports;

pub use domain::*;
pub use genesis::*;
pub use handler::*;
pub use keeper::*;
pub use module::*;
pub use ports::*;
