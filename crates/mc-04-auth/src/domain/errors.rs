use mc_02_module::ModuleError;
use mc_03_params::ParamsError;
use shared_types::{Address, FatalError, TxError};
use thiserror::Error;

pub const AUTH_CODESPACE: &str = "auth";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("account {0} does not exist")]
    UnknownAddress(Address),

    #[error("module {0} has no entry in the module account permission table")]
    MissingModulePermission(String),

    #[error("account {address} is a module account and cannot sign")]
    ModuleAccountSigner { address: Address },

    #[error("public key does not match address {0}")]
    PubKeyMismatch(Address),

    #[error("invalid genesis account: {0}")]
    InvalidGenesis(String),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl From<AuthError> for TxError {
    fn from(err: AuthError) -> Self {
        match err {
            e @ AuthError::UnknownAddress(_) => TxError::unknown_address(e.to_string()),
            e @ AuthError::PubKeyMismatch(_) => TxError::invalid_pub_key(e.to_string()),
            e @ AuthError::ModuleAccountSigner { .. } => TxError::unauthorized(e.to_string()),
            e @ AuthError::MissingModulePermission(_) => TxError::internal(e.to_string()),
            e @ AuthError::InvalidGenesis(_) => TxError::new(AUTH_CODESPACE, 2, e.to_string()),
            AuthError::Params(e) => e.into(),
            AuthError::Module(e) => e.into(),
        }
    }
}

impl From<AuthError> for ModuleError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingModulePermission(module) => {
                ModuleError::Fatal(FatalError::MissingModulePermission { module })
            }
            AuthError::InvalidGenesis(reason) => ModuleError::InvalidGenesis(reason),
            AuthError::Params(e) => e.into(),
            AuthError::Module(e) => e,
            other => ModuleError::Rejected(other.into()),
        }
    }
}
