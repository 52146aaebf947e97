use serde::{Deserialize, Serialize};
use shared_types::{amount_string, Address, PublicKey};

/// Tokens per unit of consensus voting power.
pub const POWER_REDUCTION: u128 = 1_000_000;

/// Voting power of `tokens`, saturating at `u64::MAX`.
pub fn tokens_to_power(tokens: u128) -> u64 {
    u64::try_from(tokens / POWER_REDUCTION).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    Unbonded,
    Bonded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator: Address,
    pub consensus_pubkey: PublicKey,
    #[serde(default)]
    pub moniker: String,
    pub status: BondStatus,
    /// Delegated tokens. Shares convert one to one since nothing slashes.
    #[serde(with = "amount_string")]
    pub tokens: u128,
}

impl Validator {
    pub fn power(&self) -> u64 {
        tokens_to_power(self.tokens)
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: Address,
    pub validator: Address,
    #[serde(with = "amount_string")]
    pub shares: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingEntry {
    pub id: u64,
    pub delegator: Address,
    pub validator: Address,
    pub creation_height: u64,
    /// Block time in seconds at which the tokens are released.
    pub completion_time: u64,
    #[serde(with = "amount_string")]
    pub amount: u128,
}

/// Power last reported to consensus for one validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastValidatorPower {
    pub pub_key: PublicKey,
    pub power: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalValidator {
    pub operator: Address,
    pub power: u64,
}

/// Header fields and bonded set recorded at the start of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalInfo {
    pub height: u64,
    pub time: u64,
    pub validators: Vec<HistoricalValidator>,
}
