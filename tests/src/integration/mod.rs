//! Cross-crate scenarios driven through [`node_runtime::ChainApp`].

pub mod assembly;
pub mod determinism;
pub mod genesis;
pub mod lifecycle;
pub mod staking;
pub mod transfers;
