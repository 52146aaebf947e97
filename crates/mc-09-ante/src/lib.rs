//! # mc-09-ante
//!
//! Admission pipeline run before any message handler.
//!
//! ## Decorator Chain
//!
//! ```text
//! ValidateBasic → TxTimeoutHeight → ValidateMemo → ConsumeTxSize
//!   → SetPubKey → ValidateSigCount → SigGasConsume → SigVerification
//!   → MempoolFee → DeductFee → IncrementSequence
//! ```
//!
//! The chain short-circuits on the first failure and runs inside a cache
//! branch, so a rejected transaction leaves no writes and no events. Gas
//! consumed up to the failure is still reported.
//!
//! `MempoolFee` only runs in check mode: minimum gas prices are local node
//! policy and must never influence block execution.

pub mod decorators;
pub mod domain;
pub mod handler;
pub mod ports;

pub use decorators::*;
pub use domain::*;
pub use handler::*;
pub use ports::*;
