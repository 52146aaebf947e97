use crate::{StakingGenesis, StakingKeeper, StakingMsgHandler, StakingQuery};
use mc_02_module::{AppModule, BeginBlockHook, Context, EndBlockHook, Hook, ModuleError};
use shared_types::{module_names, ValidatorUpdate};
use std::sync::Arc;

pub const CONSENSUS_VERSION: u64 = 2;

/// Begin-block records historical info; end-block settles the validator
/// set and pays out matured unbondings.
pub struct StakingHooks {
    keeper: Arc<StakingKeeper>,
}

impl BeginBlockHook for StakingHooks {
    fn begin_block(&self, ctx: &mut Context<'_>) -> Result<(), ModuleError> {
        Ok(self.keeper.track_historical_info(ctx)?)
    }
}

impl EndBlockHook for StakingHooks {
    fn end_block(&self, ctx: &mut Context<'_>) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let updates = self.keeper.apply_validator_set_updates(ctx)?;
        self.keeper.complete_unbondings(ctx)?;
        Ok(updates)
    }
}

pub fn app_module(keeper: Arc<StakingKeeper>) -> AppModule {
    let hooks = Arc::new(StakingHooks {
        keeper: keeper.clone(),
    });
    AppModule::new(module_names::STAKING, CONSENSUS_VERSION)
        .with_genesis(Hook::Active(Arc::new(StakingGenesis::new(keeper.clone()))))
        .with_begin_block(Hook::Active(hooks.clone()))
        .with_end_block(Hook::Active(hooks))
        .with_msg_handler(Arc::new(StakingMsgHandler::new(keeper.clone())))
        .with_query_handler(Arc::new(StakingQuery::new(keeper)))
}
