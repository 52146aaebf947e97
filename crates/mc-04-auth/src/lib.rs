//! # mc-04-auth
//!
//! Account keeper.
//!
//! Owns the `auth` partition: base accounts (public key, account number,
//! sequence) and module accounts (a name plus the permissions granted by the
//! module-account permission table). Other keepers reach accounts only
//! through the operations exposed here.
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `0x01 ‖ address` | [`Account`] |
//! | `0x02` | next account number (`u64`) |

pub mod domain;
pub mod genesis;
pub mod keeper;
pub mod module;

pub use domain::*;
pub use genesis::*;
pub use keeper::*;
pub use module::*;
