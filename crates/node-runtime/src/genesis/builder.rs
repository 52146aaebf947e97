//! Genesis document and builder.

use crate::app::InitChainRequest;
use crate::registry::GenesisState;
use ed25519_dalek::SigningKey;
use mc_04_auth::{Account, AuthGenesisState, BaseAccount};
use mc_05_bank::{Balance, BankGenesisState};
use mc_06_staking::{MsgCreateValidator, StakingGenesisState, StakingParams};
use mc_08_genutil::{build_gen_tx, GenutilGenesisState};
use serde::{Deserialize, Serialize};
use shared_types::{module_names, Address, Coin, Coins, CoinsError, PublicKey};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("invalid genesis configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot encode genesis section {section}: {reason}")]
    Encode { section: String, reason: String },

    #[error("cannot read genesis file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed genesis document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<CoinsError> for GenesisError {
    fn from(err: CoinsError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisDoc {
    pub chain_id: String,
    pub genesis_time: u64,
    #[serde(default)]
    pub app_state: GenesisState,
}

impl GenesisDoc {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenesisError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_json(&self) -> Result<String, GenesisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_init_chain_request(&self) -> Result<InitChainRequest, GenesisError> {
        Ok(InitChainRequest {
            chain_id: self.chain_id.clone(),
            genesis_time: self.genesis_time,
            app_state_bytes: serde_json::to_vec(&self.app_state)?,
        })
    }
}

/// A validator created from a self-signed genesis transaction.
struct GenesisValidator {
    key: SigningKey,
    moniker: String,
    self_bond: u128,
}

/// Builds the auth, bank, staking and genutil sections of a genesis
/// document.
///
/// Every validator operator is funded with its self-bond on top of any
/// balance added through [`GenesisBuilder::account`].
pub struct GenesisBuilder {
    chain_id: String,
    genesis_time: u64,
    bond_denom: String,
    balances: BTreeMap<Address, Coins>,
    validators: Vec<GenesisValidator>,
}

impl GenesisBuilder {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            genesis_time: 0,
            bond_denom: StakingParams::default().bond_denom,
            balances: BTreeMap::new(),
            validators: Vec::new(),
        }
    }

    /// One validator holding `self_bond` of the bond denom.
    pub fn devnet(chain_id: impl Into<String>, key: SigningKey, self_bond: u128) -> Self {
        Self::new(chain_id).validator(key, "devnet-0", self_bond)
    }

    #[must_use]
    pub fn genesis_time(mut self, time: u64) -> Self {
        self.genesis_time = time;
        self
    }

    #[must_use]
    pub fn bond_denom(mut self, denom: impl Into<String>) -> Self {
        self.bond_denom = denom.into();
        self
    }

    /// Fund `address`. Repeated calls for one address accumulate.
    pub fn account(mut self, address: Address, coins: Coins) -> Result<Self, GenesisError> {
        let entry = self.balances.entry(address).or_insert_with(Coins::empty);
        *entry = entry.checked_add(&coins)?;
        Ok(self)
    }

    #[must_use]
    pub fn validator(mut self, key: SigningKey, moniker: impl Into<String>, self_bond: u128) -> Self {
        self.validators.push(GenesisValidator {
            key,
            moniker: moniker.into(),
            self_bond,
        });
        self
    }

    pub fn build(self) -> Result<GenesisDoc, GenesisError> {
        if self.chain_id.is_empty() {
            return Err(GenesisError::InvalidConfig("chain id is empty".into()));
        }

        let mut balances = self.balances;
        let mut gen_txs = Vec::with_capacity(self.validators.len());
        for validator in &self.validators {
            if validator.self_bond == 0 {
                return Err(GenesisError::InvalidConfig(format!(
                    "validator {} has no self bond",
                    validator.moniker
                )));
            }
            let pub_key = PublicKey(validator.key.verifying_key().to_bytes());
            let operator = Address::from_pubkey(&pub_key);
            let bond = Coin::new(self.bond_denom.clone(), validator.self_bond);

            let entry = balances.entry(operator).or_insert_with(Coins::empty);
            *entry = entry.checked_add(&Coins::new(vec![bond.clone()])?)?;

            let msg = MsgCreateValidator {
                operator,
                pub_key,
                moniker: validator.moniker.clone(),
                value: bond,
            };
            let gen_tx = build_gen_tx(&self.chain_id, &validator.key, &msg)
                .map_err(|e| GenesisError::InvalidConfig(e.to_string()))?;
            gen_txs.push(gen_tx);
        }

        let accounts = balances
            .keys()
            .enumerate()
            .map(|(number, address)| Account::Base(BaseAccount::new(*address, number as u64)))
            .collect();
        let balances = balances
            .into_iter()
            .map(|(address, coins)| Balance { address, coins })
            .collect();

        let mut app_state = GenesisState::new();
        insert(
            &mut app_state,
            module_names::AUTH,
            &AuthGenesisState {
                accounts,
                ..AuthGenesisState::default()
            },
        )?;
        insert(
            &mut app_state,
            module_names::BANK,
            &BankGenesisState {
                balances,
                ..BankGenesisState::default()
            },
        )?;
        insert(
            &mut app_state,
            module_names::STAKING,
            &StakingGenesisState {
                params: StakingParams {
                    bond_denom: self.bond_denom,
                    ..StakingParams::default()
                },
                ..StakingGenesisState::default()
            },
        )?;
        insert(
            &mut app_state,
            module_names::GENUTIL,
            &GenutilGenesisState { gen_txs },
        )?;

        info!(
            chain_id = %self.chain_id,
            validators = self.validators.len(),
            "[Genesis] document built"
        );
        Ok(GenesisDoc {
            chain_id: self.chain_id,
            genesis_time: self.genesis_time,
            app_state,
        })
    }
}

fn insert<T: Serialize>(
    state: &mut GenesisState,
    section: &str,
    value: &T,
) -> Result<(), GenesisError> {
    let value = serde_json::to_value(value).map_err(|e| GenesisError::Encode {
        section: section.to_string(),
        reason: e.to_string(),
    })?;
    state.insert(section.to_string(), value);
    Ok(())
}
