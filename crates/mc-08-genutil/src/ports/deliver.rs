use mc_02_module::{Context, ModuleError};
use shared_types::ValidatorUpdate;

/// Runs one transaction through admission and message routing.
pub trait GenesisTxDeliverer: Send + Sync {
    /// A rejected transaction is reported as [`ModuleError::Rejected`].
    fn deliver_genesis_tx(&self, ctx: &mut Context<'_>, tx_bytes: &[u8]) -> Result<(), ModuleError>;
}

/// What genutil needs from staking once genesis transactions ran.
pub trait ValidatorSetSource: Send + Sync {
    fn apply_validator_set_updates(
        &self,
        ctx: &mut Context<'_>,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError>;
}
