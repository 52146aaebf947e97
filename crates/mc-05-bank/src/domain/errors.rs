use mc_01_store::StoreError;
use mc_02_module::ModuleError;
use mc_03_params::ParamsError;
use shared_types::{Address, CoinsError, Permission, TxError};
use thiserror::Error;

pub const BANK_CODESPACE: &str = "bank";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("insufficient funds in {address}: {reason}")]
    InsufficientFunds { address: Address, reason: String },

    #[error("invalid coins: {0}")]
    InvalidCoins(String),

    #[error("{0} is not allowed to receive funds")]
    Blocked(Address),

    #[error("module account {module} does not have {permission} permission")]
    MissingPermission {
        module: String,
        permission: Permission,
    },

    #[error("send is disabled")]
    SendDisabled,

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl From<StoreError> for BankError {
    fn from(err: StoreError) -> Self {
        Self::Module(err.into())
    }
}

impl From<CoinsError> for BankError {
    fn from(err: CoinsError) -> Self {
        Self::InvalidCoins(err.to_string())
    }
}

impl From<BankError> for TxError {
    fn from(err: BankError) -> Self {
        match err {
            e @ BankError::InsufficientFunds { .. } => TxError::insufficient_funds(e.to_string()),
            e @ BankError::InvalidCoins(_) => TxError::invalid_coins(e.to_string()),
            e @ BankError::Blocked(_) => TxError::unauthorized(e.to_string()),
            e @ BankError::MissingPermission { .. } => TxError::unauthorized(e.to_string()),
            e @ BankError::SendDisabled => TxError::new(BANK_CODESPACE, 2, e.to_string()),
            BankError::Params(e) => e.into(),
            BankError::Module(e) => e.into(),
        }
    }
}

impl From<BankError> for ModuleError {
    fn from(err: BankError) -> Self {
        match err {
            BankError::Params(e) => e.into(),
            BankError::Module(e) => e,
            other => ModuleError::Rejected(other.into()),
        }
    }
}
