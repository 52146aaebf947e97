use crate::{GenesisTxDeliverer, GenutilGenesis, ValidatorSetSource};
use mc_02_module::{AppModule, Hook};
use shared_types::module_names;
use std::sync::Arc;

pub const CONSENSUS_VERSION: u64 = 1;

/// Genutil keeps empty slots in the begin-block and end-block orders.
pub fn app_module(
    deliverer: Arc<dyn GenesisTxDeliverer>,
    validators: Arc<dyn ValidatorSetSource>,
) -> AppModule {
    AppModule::new(module_names::GENUTIL, CONSENSUS_VERSION)
        .with_genesis(Hook::Active(Arc::new(GenutilGenesis::new(deliverer, validators))))
        .with_begin_block(Hook::NoOp)
        .with_end_block(Hook::NoOp)
}
