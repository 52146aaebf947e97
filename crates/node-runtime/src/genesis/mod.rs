//! # Genesis
//!
//! The genesis document handed to `init_chain` and a builder for local
//! networks.
//!
//! ## Document Layout
//!
//! ```text
//! GenesisDoc
//! ├── chain_id
//! ├── genesis_time        (seconds since the Unix epoch)
//! └── app_state           (one JSON section per module name)
//!     ├── auth            accounts, params
//!     ├── bank            balances, supply, params
//!     ├── staking         params (validators come from gen_txs)
//!     └── genutil         gen_txs, hex encoded signed transactions
//! ```
//!
//! A module without a section starts from its default genesis.

pub mod builder;

pub use builder::{GenesisBuilder, GenesisDoc, GenesisError};
