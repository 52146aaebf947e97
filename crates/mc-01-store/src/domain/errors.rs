use shared_types::{FatalError, TxError};
use thiserror::Error;

/// Codespace reported for store failures that reach a transaction result.
pub const STORE_CODESPACE: &str = "store";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("duplicate {kind} store key: {name}")]
    DuplicateKey { name: String, kind: String },

    #[error("invalid store name: {0:?}")]
    InvalidName(String),

    #[error("partitions are sealed; cannot allocate {name}")]
    Sealed { name: String },

    #[error("store not mounted: {name}")]
    NotMounted { name: String },

    #[error("store {name} is read-only in this view")]
    ReadOnly { name: String },

    #[error("version {version} not found (latest {latest})")]
    VersionNotFound { version: u64, latest: u64 },

    #[error("codec error: {0}")]
    Codec(String),
}

impl StoreError {
    pub fn code(&self) -> u32 {
        match self {
            Self::DuplicateKey { .. } => 2,
            Self::InvalidName(_) => 3,
            Self::Sealed { .. } => 4,
            Self::NotMounted { .. } => 5,
            Self::ReadOnly { .. } => 6,
            Self::VersionNotFound { .. } => 7,
            Self::Codec(_) => 8,
        }
    }
}

impl From<StoreError> for FatalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { name, kind } => FatalError::DuplicateStoreKey { name, kind },
            StoreError::Sealed { name } => FatalError::PartitionsSealed { name },
            StoreError::NotMounted { name } => FatalError::UnmountedStore { name },
            other => FatalError::Store(other.to_string()),
        }
    }
}

impl From<StoreError> for TxError {
    fn from(err: StoreError) -> Self {
        TxError::new(STORE_CODESPACE, err.code(), err.to_string())
    }
}
