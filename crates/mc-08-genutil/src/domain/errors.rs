use mc_02_module::ModuleError;
use shared_types::{module_names, FatalError, TxError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenutilError {
    #[error("genesis transaction {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("genesis transaction {index} was rejected: {error}")]
    Rejected { index: usize, error: TxError },

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl From<GenutilError> for ModuleError {
    fn from(err: GenutilError) -> Self {
        match err {
            GenutilError::Malformed { .. } => ModuleError::InvalidGenesis(err.to_string()),
            e @ GenutilError::Rejected { .. } => ModuleError::Fatal(FatalError::Genesis {
                module: module_names::GENUTIL.to_string(),
                reason: e.to_string(),
            }),
            GenutilError::Module(e) => e,
        }
    }
}
