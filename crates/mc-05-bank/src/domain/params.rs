use crate::BankError;
use mc_02_module::Context;
use mc_03_params::{any_value, KeyTable, ParamKind, ParamValue, Subspace};
use serde::{Deserialize, Serialize};

pub const KEY_DEFAULT_SEND_ENABLED: &str = "default_send_enabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankParams {
    pub default_send_enabled: bool,
}

impl Default for BankParams {
    fn default() -> Self {
        Self {
            default_send_enabled: true,
        }
    }
}

impl BankParams {
    pub fn key_table() -> KeyTable {
        KeyTable::new().register(KEY_DEFAULT_SEND_ENABLED, ParamKind::Bool, any_value)
    }

    pub fn pairs(&self) -> Vec<(&'static str, ParamValue)> {
        vec![(
            KEY_DEFAULT_SEND_ENABLED,
            ParamValue::Bool(self.default_send_enabled),
        )]
    }

    pub fn load(subspace: &Subspace, ctx: &mut Context<'_>) -> Result<Self, BankError> {
        Ok(Self {
            default_send_enabled: subspace.get_bool(ctx, KEY_DEFAULT_SEND_ENABLED)?,
        })
    }
}
