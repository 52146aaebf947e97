use crate::app::TxRunner;
use mc_02_module::{Context, ModuleError, Tx};
use mc_08_genutil::GenesisTxDeliverer;
use std::sync::Arc;
use tracing::debug;

/// Delivers genesis transactions through the same admission and routing
/// path as block transactions.
pub struct GenesisTxAdapter {
    runner: Arc<TxRunner>,
}

impl GenesisTxAdapter {
    pub fn new(runner: Arc<TxRunner>) -> Self {
        Self { runner }
    }
}

impl GenesisTxDeliverer for GenesisTxAdapter {
    fn deliver_genesis_tx(&self, ctx: &mut Context<'_>, tx_bytes: &[u8]) -> Result<(), ModuleError> {
        let tx = Tx::decode(tx_bytes)?;
        let data = self.runner.execute(ctx, &tx, tx_bytes.len() as u64)??;
        debug!(bytes = tx_bytes.len(), data = data.len(), "[Genutil] genesis transaction applied");
        Ok(())
    }
}
