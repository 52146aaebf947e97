use mc_02_module::ModuleError;
use shared_types::{FatalError, TxError};
use thiserror::Error;

pub const PARAMS_CODESPACE: &str = "params";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("parameter {key} is not registered in subspace {subspace}")]
    UnregisteredKey { subspace: String, key: String },

    #[error("subspace {0} has no key table")]
    NoKeyTable(String),

    #[error("parameter {subspace}/{key} is not set")]
    NotFound { subspace: String, key: String },

    #[error("invalid value for {subspace}/{key}: {reason}")]
    InvalidValue {
        subspace: String,
        key: String,
        reason: String,
    },

    #[error("{authority} may not change parameters of {subspace}")]
    Unauthorized { subspace: String, authority: String },

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl ParamsError {
    /// Reading or writing a key outside the closed key set is a programming
    /// error, not a transaction failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnregisteredKey { .. } | Self::NoKeyTable(_))
            || matches!(self, Self::Module(ModuleError::Fatal(_)))
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::UnregisteredKey { .. } => 2,
            Self::NoKeyTable(_) => 3,
            Self::NotFound { .. } => 4,
            Self::InvalidValue { .. } => 5,
            Self::Unauthorized { .. } => 6,
            Self::Module(_) => 1,
        }
    }
}

impl From<ParamsError> for FatalError {
    fn from(err: ParamsError) -> Self {
        match err {
            ParamsError::UnregisteredKey { subspace, key } => {
                FatalError::UnregisteredParam { subspace, key }
            }
            ParamsError::Module(ModuleError::Fatal(e)) => e,
            other => FatalError::Store(other.to_string()),
        }
    }
}

impl From<ParamsError> for TxError {
    fn from(err: ParamsError) -> Self {
        match err {
            ParamsError::Module(e) => e.into(),
            other => TxError::new(PARAMS_CODESPACE, other.code(), other.to_string()),
        }
    }
}

impl From<ParamsError> for ModuleError {
    fn from(err: ParamsError) -> Self {
        if err.is_fatal() {
            return ModuleError::Fatal(err.into());
        }
        match err {
            ParamsError::Module(e) => e,
            other => ModuleError::Rejected(other.into()),
        }
    }
}
