//! # mc-06-staking
//!
//! Validators, delegations, the bonded and not-bonded pools, the unbonding
//! queue and the validator-set delta handed to consensus at end-block.
//!
//! ## Voting Power
//!
//! `power = tokens / POWER_REDUCTION`. At end-block the top `max_validators`
//! validators by power (ties broken by operator address) form the bonded
//! set. Only validators whose power changed are reported, and validators
//! that left the set are reported with power 0.
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `0x11 ‖ operator` | last reported power and consensus key |
//! | `0x21 ‖ operator` | validator |
//! | `0x22 ‖ consensus key` | operator address |
//! | `0x31 ‖ delegator ‖ validator` | delegation |
//! | `0x41 ‖ completion time ‖ id` | unbonding entry |
//! | `0x42` | next unbonding id |
//! | `0x50 ‖ height` | historical info |
//!
//! Integers inside keys are big-endian so prefix iteration visits them in
//! numeric order.

pub mod domain;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod module;
pub mod ports;
pub mod valset;

pub use domain::*;
pub use genesis::*;
pub use handler::*;
pub use keeper::*;
pub use module::*;
pub use ports::*;
