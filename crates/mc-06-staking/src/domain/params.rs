use crate::StakingError;
use mc_02_module::Context;
use mc_03_params::{any_value, non_empty_text, positive, KeyTable, ParamKind, ParamValue, Subspace};
use serde::{Deserialize, Serialize};

pub const KEY_UNBONDING_TIME: &str = "unbonding_time";
pub const KEY_MAX_VALIDATORS: &str = "max_validators";
pub const KEY_MAX_ENTRIES: &str = "max_entries";
pub const KEY_HISTORICAL_ENTRIES: &str = "historical_entries";
pub const KEY_BOND_DENOM: &str = "bond_denom";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// Seconds between an undelegation and the release of its tokens.
    pub unbonding_time: u64,
    pub max_validators: u64,
    /// Maximum pending unbonding entries per delegator and validator pair.
    pub max_entries: u64,
    /// Historical info entries kept; 0 disables tracking.
    pub historical_entries: u64,
    pub bond_denom: String,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            unbonding_time: 21 * 24 * 60 * 60,
            max_validators: 100,
            max_entries: 7,
            historical_entries: 10_000,
            bond_denom: "stake".into(),
        }
    }
}

impl StakingParams {
    pub fn key_table() -> KeyTable {
        KeyTable::new()
            .register(KEY_UNBONDING_TIME, ParamKind::Duration, positive)
            .register(KEY_MAX_VALIDATORS, ParamKind::Count, positive)
            .register(KEY_MAX_ENTRIES, ParamKind::Count, positive)
            .register(KEY_HISTORICAL_ENTRIES, ParamKind::Count, any_value)
            .register(KEY_BOND_DENOM, ParamKind::Text, non_empty_text)
    }

    pub fn pairs(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            (KEY_UNBONDING_TIME, ParamValue::Duration(self.unbonding_time)),
            (KEY_MAX_VALIDATORS, ParamValue::Count(self.max_validators)),
            (KEY_MAX_ENTRIES, ParamValue::Count(self.max_entries)),
            (KEY_HISTORICAL_ENTRIES, ParamValue::Count(self.historical_entries)),
            (KEY_BOND_DENOM, ParamValue::Text(self.bond_denom.clone())),
        ]
    }

    pub fn load(subspace: &Subspace, ctx: &mut Context<'_>) -> Result<Self, StakingError> {
        Ok(Self {
            unbonding_time: subspace.get_duration(ctx, KEY_UNBONDING_TIME)?,
            max_validators: subspace.get_count(ctx, KEY_MAX_VALIDATORS)?,
            max_entries: subspace.get_count(ctx, KEY_MAX_ENTRIES)?,
            historical_entries: subspace.get_count(ctx, KEY_HISTORICAL_ENTRIES)?,
            bond_denom: subspace.get_text(ctx, KEY_BOND_DENOM)?,
        })
    }

    pub fn validate(&self) -> Result<(), StakingError> {
        let table = Self::key_table();
        for (key, value) in self.pairs() {
            if let Some(spec) = table.spec(key) {
                spec.validate(&value)
                    .map_err(|reason| StakingError::InvalidGenesis(format!("{key}: {reason}")))?;
            }
        }
        shared_types::validate_denom(&self.bond_denom)
            .map_err(|e| StakingError::InvalidGenesis(e.to_string()))
    }
}
