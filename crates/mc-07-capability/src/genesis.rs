use crate::{CapabilityError, CapabilityKeeper, CapabilityOwners};
use mc_02_module::{parse_genesis, to_genesis_value, Context, Genesis, ModuleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::ValidatorUpdate;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisOwners {
    pub index: u64,
    pub index_owners: CapabilityOwners,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityGenesisState {
    /// Next capability index.
    pub index: u64,
    #[serde(default)]
    pub owners: Vec<GenesisOwners>,
}

impl Default for CapabilityGenesisState {
    fn default() -> Self {
        Self {
            index: 1,
            owners: Vec::new(),
        }
    }
}

impl CapabilityGenesisState {
    pub fn validate(&self) -> Result<(), CapabilityError> {
        let invalid = |reason: String| CapabilityError::InvalidGenesis(reason);
        if self.index == 0 {
            return Err(invalid("index must be positive".into()));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.owners {
            if entry.index == 0 || entry.index >= self.index {
                return Err(invalid(format!(
                    "owner index {} outside [1, {})",
                    entry.index, self.index
                )));
            }
            if !seen.insert(entry.index) {
                return Err(invalid(format!("duplicate owner index {}", entry.index)));
            }
            if entry.index_owners.is_empty() {
                return Err(invalid(format!("capability {} has no owners", entry.index)));
            }
            for owner in &entry.index_owners.owners {
                if owner.module.is_empty() || owner.name.is_empty() {
                    return Err(invalid(format!("capability {} has a blank owner", entry.index)));
                }
            }
        }
        Ok(())
    }
}

pub struct CapabilityGenesis {
    keeper: Arc<CapabilityKeeper>,
}

impl CapabilityGenesis {
    pub fn new(keeper: Arc<CapabilityKeeper>) -> Self {
        Self { keeper }
    }
}

impl Genesis for CapabilityGenesis {
    fn default_genesis(&self) -> Value {
        to_genesis_value(&CapabilityGenesisState::default()).unwrap_or(Value::Null)
    }

    fn validate_genesis(&self, state: &Value) -> Result<(), ModuleError> {
        let state: CapabilityGenesisState = parse_genesis(state)?;
        Ok(state.validate()?)
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: CapabilityGenesisState = parse_genesis(state)?;
        state.validate()?;
        self.keeper.initialize_index(ctx, state.index)?;
        for entry in &state.owners {
            let mut owners = CapabilityOwners::default();
            for owner in &entry.index_owners.owners {
                owners.add(owner.clone());
            }
            self.keeper.set_owners(ctx, entry.index, &owners)?;
        }
        self.keeper.init_memory_store(ctx)?;
        info!(index = state.index, capabilities = state.owners.len(), "[Capability] genesis initialized");
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &mut Context<'_>) -> Result<Value, ModuleError> {
        let owners = self
            .keeper
            .all_owners(ctx)?
            .into_iter()
            .map(|(index, index_owners)| GenesisOwners { index, index_owners })
            .collect();
        let state = CapabilityGenesisState {
            index: self.keeper.latest_index(ctx)?,
            owners,
        };
        to_genesis_value(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::setup;
    use mc_02_module::{BlockHeader, ExecMode};
    use serde_json::json;

    #[test]
    fn test_genesis_restores_owners_and_memory() {
        let (mut root, keeper) = setup();
        let ibc = keeper.scope_to_module("ibc").unwrap();
        let keeper = Arc::new(keeper);
        let genesis = CapabilityGenesis::new(keeper.clone());
        let state = json!({
            "index": 3,
            "owners": [{ "index": 2, "index_owners": { "owners": [{ "module": "ibc", "name": "port" }] } }]
        });
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Genesis);
        genesis.validate_genesis(&state).unwrap();
        genesis.init_genesis(&mut ctx, &state).unwrap();

        let cap = ibc.get_capability(&mut ctx, "port").unwrap().unwrap();
        assert_eq!(cap.index(), 2);
        assert_eq!(ibc.new_capability(&mut ctx, "next").unwrap().index(), 3);

        let exported: CapabilityGenesisState =
            serde_json::from_value(genesis.export_genesis(&mut ctx).unwrap()).unwrap();
        assert_eq!(exported.index, 4);
        assert_eq!(exported.owners.len(), 2);
    }

    #[test]
    fn test_owner_index_beyond_next_is_invalid() {
        let state = CapabilityGenesisState {
            index: 2,
            owners: vec![GenesisOwners {
                index: 2,
                index_owners: CapabilityOwners {
                    owners: vec![crate::Owner::new("ibc", "port")],
                },
            }],
        };
        assert!(matches!(state.validate(), Err(CapabilityError::InvalidGenesis(_))));
    }
}
