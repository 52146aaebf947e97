use crate::{GenesisTxDeliverer, GenutilError, GenutilGenesisState, ValidatorSetSource};
use mc_02_module::{parse_genesis, to_genesis_value, Context, Genesis, ModuleError};
use serde_json::Value;
use shared_types::ValidatorUpdate;
use std::sync::Arc;
use tracing::info;

pub struct GenutilGenesis {
    deliverer: Arc<dyn GenesisTxDeliverer>,
    validators: Arc<dyn ValidatorSetSource>,
}

impl GenutilGenesis {
    pub fn new(
        deliverer: Arc<dyn GenesisTxDeliverer>,
        validators: Arc<dyn ValidatorSetSource>,
    ) -> Self {
        Self {
            deliverer,
            validators,
        }
    }
}

impl Genesis for GenutilGenesis {
    fn default_genesis(&self) -> Value {
        to_genesis_value(&GenutilGenesisState::default()).unwrap_or(Value::Null)
    }

    fn validate_genesis(&self, state: &Value) -> Result<(), ModuleError> {
        let state: GenutilGenesisState = parse_genesis(state)?;
        state.decode_all()?;
        Ok(())
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: GenutilGenesisState = parse_genesis(state)?;
        let txs = state.decode_all()?;
        if txs.is_empty() {
            return Ok(Vec::new());
        }
        for (index, bytes) in txs.iter().enumerate() {
            match self.deliverer.deliver_genesis_tx(ctx, bytes) {
                Ok(()) => {}
                Err(ModuleError::Rejected(error)) => {
                    return Err(GenutilError::Rejected { index, error }.into());
                }
                Err(other) => return Err(other),
            }
        }
        let updates = self.validators.apply_validator_set_updates(ctx)?;
        info!(
            gen_txs = txs.len(),
            validators = updates.len(),
            "[Genutil] genesis transactions delivered"
        );
        Ok(updates)
    }

    /// Genesis transactions are consumed at launch and never exported.
    fn export_genesis(&self, _ctx: &mut Context<'_>) -> Result<Value, ModuleError> {
        to_genesis_value(&GenutilGenesisState::default())
    }
}
