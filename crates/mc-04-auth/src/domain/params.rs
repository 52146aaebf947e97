use crate::AuthError;
use mc_02_module::Context;
use mc_03_params::{positive, KeyTable, ParamKind, ParamValue, Subspace};
use serde::{Deserialize, Serialize};

pub const KEY_MAX_MEMO_CHARACTERS: &str = "max_memo_characters";
pub const KEY_TX_SIG_LIMIT: &str = "tx_sig_limit";
pub const KEY_TX_SIZE_COST_PER_BYTE: &str = "tx_size_cost_per_byte";
pub const KEY_SIG_VERIFY_COST_ED25519: &str = "sig_verify_cost_ed25519";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    pub max_memo_characters: u64,
    pub tx_sig_limit: u64,
    pub tx_size_cost_per_byte: u64,
    pub sig_verify_cost_ed25519: u64,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_ed25519: 590,
        }
    }
}

impl AuthParams {
    pub fn key_table() -> KeyTable {
        KeyTable::new()
            .register(KEY_MAX_MEMO_CHARACTERS, ParamKind::Count, positive)
            .register(KEY_TX_SIG_LIMIT, ParamKind::Count, positive)
            .register(KEY_TX_SIZE_COST_PER_BYTE, ParamKind::Count, positive)
            .register(KEY_SIG_VERIFY_COST_ED25519, ParamKind::Count, positive)
    }

    pub fn pairs(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            (KEY_MAX_MEMO_CHARACTERS, ParamValue::Count(self.max_memo_characters)),
            (KEY_TX_SIG_LIMIT, ParamValue::Count(self.tx_sig_limit)),
            (KEY_TX_SIZE_COST_PER_BYTE, ParamValue::Count(self.tx_size_cost_per_byte)),
            (KEY_SIG_VERIFY_COST_ED25519, ParamValue::Count(self.sig_verify_cost_ed25519)),
        ]
    }

    pub fn load(subspace: &Subspace, ctx: &mut Context<'_>) -> Result<Self, AuthError> {
        Ok(Self {
            max_memo_characters: subspace.get_count(ctx, KEY_MAX_MEMO_CHARACTERS)?,
            tx_sig_limit: subspace.get_count(ctx, KEY_TX_SIG_LIMIT)?,
            tx_size_cost_per_byte: subspace.get_count(ctx, KEY_TX_SIZE_COST_PER_BYTE)?,
            sig_verify_cost_ed25519: subspace.get_count(ctx, KEY_SIG_VERIFY_COST_ED25519)?,
        })
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        let table = Self::key_table();
        for (key, value) in self.pairs() {
            if let Some(spec) = table.spec(key) {
                spec.validate(&value)
                    .map_err(|reason| AuthError::InvalidGenesis(format!("{key}: {reason}")))?;
            }
        }
        Ok(())
    }
}
