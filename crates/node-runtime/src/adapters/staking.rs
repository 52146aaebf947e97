use mc_02_module::{Context, ModuleError};
use mc_06_staking::StakingKeeper;
use mc_08_genutil::ValidatorSetSource;
use shared_types::ValidatorUpdate;
use std::sync::Arc;

/// Lets genutil read the validator set produced by genesis transactions.
pub struct StakingAdapter {
    keeper: Arc<StakingKeeper>,
}

impl StakingAdapter {
    pub fn new(keeper: Arc<StakingKeeper>) -> Self {
        Self { keeper }
    }
}

impl ValidatorSetSource for StakingAdapter {
    fn apply_validator_set_updates(
        &self,
        ctx: &mut Context<'_>,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        Ok(self.keeper.apply_validator_set_updates(ctx)?)
    }
}
