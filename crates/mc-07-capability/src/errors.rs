use mc_01_store::StoreError;
use mc_02_module::ModuleError;
use shared_types::TxError;
use thiserror::Error;

pub const CAPABILITY_CODESPACE: &str = "capability";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("capability name cannot be empty")]
    EmptyName,

    #[error("module {module} already has a capability named {name}")]
    NameTaken { module: String, name: String },

    #[error("module {module} already owns capability {index}")]
    AlreadyOwned { module: String, index: u64 },

    #[error("module {module} does not own capability {index}")]
    NotOwned { module: String, index: u64 },

    #[error("capability {0} has no owners")]
    NoOwners(u64),

    #[error("invalid capability genesis: {0}")]
    InvalidGenesis(String),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl CapabilityError {
    pub fn code(&self) -> u32 {
        match self {
            Self::EmptyName => 2,
            Self::NameTaken { .. } => 3,
            Self::AlreadyOwned { .. } => 4,
            Self::NotOwned { .. } => 5,
            Self::NoOwners(_) => 6,
            Self::InvalidGenesis(_) => 7,
            Self::Module(_) => 1,
        }
    }
}

impl From<StoreError> for CapabilityError {
    fn from(err: StoreError) -> Self {
        Self::Module(err.into())
    }
}

impl From<CapabilityError> for TxError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Module(e) => e.into(),
            other => TxError::new(CAPABILITY_CODESPACE, other.code(), other.to_string()),
        }
    }
}

impl From<CapabilityError> for ModuleError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::InvalidGenesis(reason) => ModuleError::InvalidGenesis(reason),
            CapabilityError::Module(e) => e,
            other => ModuleError::Rejected(other.into()),
        }
    }
}
