use crate::{Account, AuthError, AuthKeeper, AuthParams};
use mc_02_module::{parse_genesis, to_genesis_value, Context, Genesis, ModuleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{module_names, Address, ValidatorUpdate};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthGenesisState {
    #[serde(default)]
    pub params: AuthParams,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AuthGenesisState {
    pub fn validate(&self) -> Result<(), AuthError> {
        self.params.validate()?;
        let mut addresses = BTreeSet::new();
        let mut numbers = BTreeSet::new();
        for account in &self.accounts {
            if !addresses.insert(account.address()) {
                return Err(AuthError::InvalidGenesis(format!(
                    "duplicate account {}",
                    account.address()
                )));
            }
            if !numbers.insert(account.account_number()) {
                return Err(AuthError::InvalidGenesis(format!(
                    "duplicate account number {}",
                    account.account_number()
                )));
            }
            if let Some(m) = account.as_module() {
                if Address::module(&m.name) != m.base.address {
                    return Err(AuthError::InvalidGenesis(format!(
                        "module account {} has address {}",
                        m.name, m.base.address
                    )));
                }
            }
        }
        Ok(())
    }
}

pub struct AuthGenesis {
    keeper: Arc<AuthKeeper>,
}

impl AuthGenesis {
    pub fn new(keeper: Arc<AuthKeeper>) -> Self {
        Self { keeper }
    }
}

impl Genesis for AuthGenesis {
    fn default_genesis(&self) -> Value {
        to_genesis_value(&AuthGenesisState::default()).unwrap_or(Value::Null)
    }

    fn validate_genesis(&self, state: &Value) -> Result<(), ModuleError> {
        let state: AuthGenesisState = parse_genesis(state)?;
        Ok(state.validate()?)
    }

    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError> {
        let state: AuthGenesisState = parse_genesis(state)?;
        state.validate()?;
        self.keeper.set_params(ctx, &state.params)?;

        let mut accounts = state.accounts.clone();
        accounts.sort_by_key(Account::account_number);
        for account in &accounts {
            self.keeper.set_account(ctx, account)?;
        }
        let floor = accounts.last().map_or(0, |a| a.account_number() + 1);
        self.keeper.ensure_account_number_above(ctx, floor)?;

        self.keeper
            .get_module_account(ctx, module_names::FEE_COLLECTOR)?;
        info!(accounts = accounts.len(), "[Auth] genesis initialized");
        Ok(Vec::new())
    }

    fn export_genesis(&self, ctx: &mut Context<'_>) -> Result<Value, ModuleError> {
        let state = AuthGenesisState {
            params: self.keeper.params(ctx)?,
            accounts: self.keeper.accounts(ctx)?,
        };
        to_genesis_value(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::setup;
    use crate::BaseAccount;
    use mc_02_module::{BlockHeader, ExecMode};
    use serde_json::json;

    #[test]
    fn test_init_and_export() {
        let (mut root, keeper) = setup();
        let keeper = Arc::new(keeper);
        let genesis = AuthGenesis::new(keeper.clone());
        let a = Address([0xAA; 20]);
        let state = json!({
            "accounts": [{ "base": { "address": a.to_string(), "account_number": 5 } }]
        });
        genesis.validate_genesis(&state).unwrap();

        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Genesis);
        assert!(genesis.init_genesis(&mut ctx, &state).unwrap().is_empty());

        let fee = keeper
            .get_account(&mut ctx, &Address::module(module_names::FEE_COLLECTOR))
            .unwrap()
            .unwrap();
        assert_eq!(fee.account_number(), 6);

        let exported: AuthGenesisState =
            serde_json::from_value(genesis.export_genesis(&mut ctx).unwrap()).unwrap();
        assert_eq!(exported.accounts.len(), 2);
        assert_eq!(exported.params, AuthParams::default());
    }

    #[test]
    fn test_duplicate_accounts_rejected() {
        let account = Account::Base(BaseAccount::new(Address([1; 20]), 0));
        let state = AuthGenesisState {
            params: AuthParams::default(),
            accounts: vec![account.clone(), account],
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_malformed_section_is_invalid_genesis() {
        let (_, keeper) = setup();
        let genesis = AuthGenesis::new(Arc::new(keeper));
        let err = genesis
            .validate_genesis(&json!({ "accounts": "nope" }))
            .unwrap_err();
        assert!(matches!(err, ModuleError::InvalidGenesis(_)));
    }
}
