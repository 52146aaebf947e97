use mc_01_store::StoreError;
use mc_02_module::ModuleError;
use mc_03_params::ParamsError;
use shared_types::{Address, CoinsError, PublicKey, TxError};
use thiserror::Error;

pub const STAKING_CODESPACE: &str = "staking";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    #[error("validator {0} already exists")]
    ValidatorExists(Address),

    #[error("consensus key {0} is already used by another validator")]
    PubKeyInUse(PublicKey),

    #[error("validator {0} does not exist")]
    ValidatorNotFound(Address),

    #[error("no delegation from {delegator} to {validator}")]
    DelegationNotFound { delegator: Address, validator: Address },

    #[error("delegation holds {available} shares, {requested} requested")]
    InsufficientShares { available: u128, requested: u128 },

    #[error("invalid bond denom: expected {expected}, got {got}")]
    InvalidBondDenom { expected: String, got: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("too many unbonding entries for {delegator} and {validator}")]
    MaxUnbondingEntries { delegator: Address, validator: Address },

    #[error("invalid staking genesis: {0}")]
    InvalidGenesis(String),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl StakingError {
    pub fn code(&self) -> u32 {
        match self {
            Self::ValidatorExists(_) => 4,
            Self::PubKeyInUse(_) => 5,
            Self::ValidatorNotFound(_) => 3,
            Self::DelegationNotFound { .. } => 19,
            Self::InsufficientShares { .. } => 22,
            Self::InvalidBondDenom { .. } => 14,
            Self::InvalidAmount(_) => 33,
            Self::MaxUnbondingEntries { .. } => 40,
            Self::InvalidGenesis(_) => 2,
            Self::Params(_) | Self::Module(_) => 1,
        }
    }
}

impl From<StoreError> for StakingError {
    fn from(err: StoreError) -> Self {
        Self::Module(err.into())
    }
}

impl From<CoinsError> for StakingError {
    fn from(err: CoinsError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

impl From<StakingError> for TxError {
    fn from(err: StakingError) -> Self {
        match err {
            StakingError::Params(e) => e.into(),
            StakingError::Module(e) => e.into(),
            other => TxError::new(STAKING_CODESPACE, other.code(), other.to_string()),
        }
    }
}

impl From<StakingError> for ModuleError {
    fn from(err: StakingError) -> Self {
        match err {
            StakingError::InvalidGenesis(reason) => ModuleError::InvalidGenesis(reason),
            StakingError::Params(e) => e.into(),
            StakingError::Module(e) => e,
            other => ModuleError::Rejected(other.into()),
        }
    }
}
