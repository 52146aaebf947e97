use mc_01_store::StoreError;
use shared_types::{FatalError, TxError};
use thiserror::Error;

/// Errors raised by the execution primitives and passed through keepers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("out of gas in location: {descriptor}; gas wanted: {limit}, gas used: {used}")]
    OutOfGas {
        descriptor: String,
        limit: u64,
        used: u64,
    },

    #[error("cannot decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("invalid genesis state: {0}")]
    InvalidGenesis(String),

    #[error(transparent)]
    Rejected(#[from] TxError),

    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl ModuleError {
    pub fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ModuleError> for TxError {
    fn from(err: ModuleError) -> Self {
        match err {
            ModuleError::Store(e) => e.into(),
            e @ ModuleError::OutOfGas { .. } => TxError::out_of_gas(e.to_string()),
            e @ ModuleError::Decode { .. } => TxError::internal(e.to_string()),
            e @ ModuleError::InvalidGenesis(_) => TxError::invalid_request(e.to_string()),
            ModuleError::Rejected(e) => e,
            ModuleError::Fatal(e) => TxError::internal(e.to_string()),
        }
    }
}
