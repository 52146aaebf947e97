use crate::{BankGenesis, BankKeeper, BankMsgHandler, BankQuery};
use mc_02_module::{AppModule, Hook};
use shared_types::module_names;
use std::sync::Arc;

pub const CONSENSUS_VERSION: u64 = 2;

pub fn app_module(keeper: Arc<BankKeeper>) -> AppModule {
    AppModule::new(module_names::BANK, CONSENSUS_VERSION)
        .with_genesis(Hook::Active(Arc::new(BankGenesis::new(keeper.clone()))))
        .with_begin_block(Hook::NoOp)
        .with_end_block(Hook::NoOp)
        .with_msg_handler(Arc::new(BankMsgHandler::new(keeper.clone())))
        .with_query_handler(Arc::new(BankQuery::new(keeper)))
}
