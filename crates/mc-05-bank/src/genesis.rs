use crate::{BankError, BankKeeper, BankParams};
use mc_02_module::{parse_genesis, to_genesis_value, Context, Genesis, ModuleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Address, Coins, ValidatorUpdate};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub address: Address,
    pub coins: Coins,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankGenesisState {
    #[serde(default)]
    pub params: BankParams,
    #[serde(default)]
    pub balances: Vec<Balance>,
    /// Expected total supply; computed from balances when empty.
    #[serde(default)]
    pub supply: Coins,
}

impl BankGenesisState {
    /// Sum of all balances.
    pub fn total(&self) -> Result<Coins, BankError> {
        let mut total = Coins::empty();
        for balance in &self.balances {
            total = total.checked_add(&balance.coins)?;
        }
        Ok(total)
    }

    pub fn validate(&self) -> Result<(), BankError> {
        let mut seen = BTreeSet::new();
        for balance in &self.balances {
            if !seen.insert(balance.address) {
                return Err(BankError::InvalidCoins(format!(
                    "duplicate balance for {}",
                    balance.address
                )));
            }
        }
        let total = self.total()?;
        if !self.supply.is_empty() && self.supply != total {
            return Err(BankError::InvalidCoins(format!(
                "genesis supply {} does not match balances {}",
                self.supply, total
            )));
        }
        Ok(())
    }
}

pub struct BankGenesis {
    keeper: Arc<BankKeeper>,
}

impl BankGenesis {
    pub fn new(keeper: Arc<BankKeeper>) -> Self {
        Self { keeper }
    }
}

fn invalid(err: BankError) -> ModuleError {
    ModuleError::InvalidGenesis(err.to_string())
}

impl Genesis for BankGenesis {
    fn default_genesis(&self) -> Value {
        to_genesis_value(&BankGenesisState::default()).unwrap_or(Value::Null)
    }

    fn validate_genesis(&self, state: &Value) -> Result<(), ModuleError> {
        let state: BankGenesisState = parse_genesis(state)?;
        state.validate().map_err(invalid)
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: BankGenesisState = parse_genesis(state)?;
        state.validate().map_err(invalid)?;
        self.keeper.set_params(ctx, &state.params)?;
        for balance in &state.balances {
            self.keeper.set_balances(ctx, &balance.address, &balance.coins)?;
        }
        let total = state.total().map_err(invalid)?;
        self.keeper.set_supply(ctx, &total)?;
        info!(balances = state.balances.len(), supply = %total, "[Bank] genesis initialized");
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &mut Context<'_>) -> Result<Value, ModuleError> {
        let balances = self
            .keeper
            .all_balances(ctx)?
            .into_iter()
            .map(|(address, coins)| Balance { address, coins })
            .collect();
        let state = BankGenesisState {
            params: self.keeper.params(ctx)?,
            balances,
            supply: self.keeper.get_total_supply(ctx)?,
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
    fn test_init_sets_balances_and_supply() {
        let (mut root, keeper, _) = setup();
        let keeper = Arc::new(keeper);
        let genesis = BankGenesis::new(keeper.clone());
        let a = Address([0xA; 20]);
        let b = Address([0xB; 20]);
        let state = json!({
            "balances": [
                { "address": a.to_string(), "coins": [{ "denom": "stake", "amount": "100" }] },
                { "address": b.to_string(), "coins": [{ "denom": "stake", "amount": "5" }] }
            ]
        });
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Genesis);
        genesis.init_genesis(&mut ctx, &state).unwrap();
        assert_eq!(keeper.get_balance(&mut ctx, &a, "stake").unwrap(), 100);
        assert_eq!(keeper.get_supply(&mut ctx, "stake").unwrap(), 105);

        let exported: BankGenesisState =
            serde_json::from_value(genesis.export_genesis(&mut ctx).unwrap()).unwrap();
        assert_eq!(exported.supply.to_string(), "105stake");
        assert_eq!(exported.balances.len(), 2);
    }

    #[test]
    fn test_supply_mismatch_is_invalid() {
        let (_, keeper, _) = setup();
        let genesis = BankGenesis::new(Arc::new(keeper));
        let state = json!({
            "balances": [{ "address": Address([1; 20]).to_string(), "coins": [{ "denom": "stake", "amount": "1" }] }],
            "supply": [{ "denom": "stake", "amount": "2" }]
        });
        assert!(matches!(
            genesis.validate_genesis(&state),
            Err(ModuleError::InvalidGenesis(_))
        ));
    }
}
