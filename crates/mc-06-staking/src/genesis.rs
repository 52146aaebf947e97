use crate::{
    BondStatus, Delegation, StakingError, StakingKeeper, StakingParams, UnbondingEntry, Validator,
};
use mc_02_module::{parse_genesis, to_genesis_value, Context, Genesis, ModuleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{module_names, Address, ValidatorUpdate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakingGenesisState {
    #[serde(default)]
    pub params: StakingParams,
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub delegations: Vec<Delegation>,
    #[serde(default)]
    pub unbonding_entries: Vec<UnbondingEntry>,
}

fn invalid(reason: impl Into<String>) -> StakingError {
    StakingError::InvalidGenesis(reason.into())
}

impl StakingGenesisState {
    pub fn validate(&self) -> Result<(), StakingError> {
        self.params.validate()?;
        let mut operators = BTreeSet::new();
        let mut pub_keys = BTreeSet::new();
        for validator in &self.validators {
            if !operators.insert(validator.operator) {
                return Err(invalid(format!("duplicate validator {}", validator.operator)));
            }
            if !pub_keys.insert(validator.consensus_pubkey) {
                return Err(invalid(format!(
                    "duplicate consensus key {}",
                    validator.consensus_pubkey
                )));
            }
        }
        let mut delegated: BTreeMap<Address, u128> = BTreeMap::new();
        for delegation in &self.delegations {
            if !operators.contains(&delegation.validator) {
                return Err(invalid(format!(
                    "delegation to unknown validator {}",
                    delegation.validator
                )));
            }
            let total = delegated.entry(delegation.validator).or_default();
            *total = total
                .checked_add(delegation.shares)
                .ok_or_else(|| invalid("delegation shares overflow"))?;
        }
        for validator in &self.validators {
            let shares = delegated.get(&validator.operator).copied().unwrap_or(0);
            if shares != validator.tokens {
                return Err(invalid(format!(
                    "validator {} has {} tokens but {} delegated shares",
                    validator.operator, validator.tokens, shares
                )));
            }
        }
        Ok(())
    }

    /// Tokens each pool must hold: (bonded, not bonded).
    fn pool_totals(&self) -> Result<(u128, u128), StakingError> {
        let overflow = || invalid("pool total overflow");
        let mut bonded: u128 = 0;
        let mut not_bonded: u128 = 0;
        for validator in &self.validators {
            let pool = match validator.status {
                BondStatus::Bonded => &mut bonded,
                BondStatus::Unbonded => &mut not_bonded,
            };
            *pool = pool.checked_add(validator.tokens).ok_or_else(overflow)?;
        }
        for entry in &self.unbonding_entries {
            not_bonded = not_bonded.checked_add(entry.amount).ok_or_else(overflow)?;
        }
        Ok((bonded, not_bonded))
    }
}

pub struct StakingGenesis {
    keeper: Arc<StakingKeeper>,
}

impl StakingGenesis {
    pub fn new(keeper: Arc<StakingKeeper>) -> Self {
        Self { keeper }
    }

    fn check_pool(
        &self,
        ctx: &mut Context<'_>,
        pool: &str,
        address: &Address,
        denom: &str,
        expected: u128,
    ) -> Result<(), StakingError> {
        let held = self.keeper.bank.balance(ctx, address, denom)?;
        if held != expected {
            return Err(invalid(format!(
                "{pool} holds {held}{denom}, validators and unbondings account for {expected}{denom}"
            )));
        }
        Ok(())
    }
}

impl Genesis for StakingGenesis {
    fn default_genesis(&self) -> Value {
        to_genesis_value(&StakingGenesisState::default()).unwrap_or(Value::Null)
    }

    fn validate_genesis(&self, state: &Value) -> Result<(), ModuleError> {
        let state: StakingGenesisState = parse_genesis(state)?;
        Ok(state.validate()?)
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: StakingGenesisState = parse_genesis(state)?;
        state.validate()?;
        let keeper = &self.keeper;
        keeper.set_params(ctx, &state.params)?;

        let bonded_pool = keeper.accounts.module_address(ctx, module_names::BONDED_POOL)?;
        let not_bonded_pool = keeper
            .accounts
            .module_address(ctx, module_names::NOT_BONDED_POOL)?;

        for validator in &state.validators {
            keeper.set_validator(ctx, validator)?;
        }
        for delegation in &state.delegations {
            keeper.set_delegation(ctx, delegation)?;
        }
        for entry in &state.unbonding_entries {
            keeper.insert_unbonding_entry(ctx, entry)?;
        }

        let (bonded, not_bonded) = state.pool_totals()?;
        let denom = &state.params.bond_denom;
        self.check_pool(ctx, module_names::BONDED_POOL, &bonded_pool, denom, bonded)?;
        self.check_pool(ctx, module_names::NOT_BONDED_POOL, &not_bonded_pool, denom, not_bonded)?;

        let updates = keeper.apply_validator_set_updates(ctx)?;
        info!(
            validators = state.validators.len(),
            delegations = state.delegations.len(),
            updates = updates.len(),
            "[Staking] genesis initialized"
        );
        Ok(updates)
    }

    fn export_genesis(&self, ctx: &mut Context<'_>) -> Result<Value, ModuleError> {
        let state = StakingGenesisState {
            params: self.keeper.params(ctx)?,
            validators: self.keeper.validators(ctx)?,
            delegations: self.keeper.delegations(ctx, None)?,
            unbonding_entries: self.keeper.unbonding_entries(ctx)?,
        };
        to_genesis_value(&state)
    }
}
