use crate::{CapabilityGenesis, CapabilityKeeper};
use mc_02_module::{AppModule, BeginBlockHook, Context, Hook, ModuleError};
use shared_types::module_names;
use std::sync::Arc;

pub const CONSENSUS_VERSION: u64 = 1;

/// Rebuilds the memory partition on the first block after a start.
pub struct CapabilityBeginBlock {
    keeper: Arc<CapabilityKeeper>,
}

impl BeginBlockHook for CapabilityBeginBlock {
    fn begin_block(&self, ctx: &mut Context<'_>) -> Result<(), ModuleError> {
        Ok(self.keeper.init_memory_store(ctx)?)
    }
}

pub fn app_module(keeper: Arc<CapabilityKeeper>) -> AppModule {
    AppModule::new(module_names::CAPABILITY, CONSENSUS_VERSION)
        .with_genesis(Hook::Active(Arc::new(CapabilityGenesis::new(keeper.clone()))))
        .with_begin_block(Hook::Active(Arc::new(CapabilityBeginBlock { keeper })))
        .with_end_block(Hook::NoOp)
}
