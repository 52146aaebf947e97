use crate::GasPrices;

/// Message types relayers send that may skip the minimum fee.
pub const DEFAULT_BYPASS_MIN_FEE_MSG_TYPES: [&str; 3] = [
    "/ibc.core.channel.v1.MsgRecvPacket",
    "/ibc.core.channel.v1.MsgAcknowledgement",
    "/ibc.core.client.v1.MsgUpdateClient",
];

pub const DEFAULT_MAX_BYPASS_MIN_FEE_MSG_GAS_USAGE: u64 = 1_000_000;

/// Node-local fee policy applied in check mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePolicy {
    pub min_gas_prices: GasPrices,
    pub bypass_min_fee_msg_types: Vec<String>,
    pub max_bypass_min_fee_msg_gas_usage: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            min_gas_prices: GasPrices::default(),
            bypass_min_fee_msg_types: DEFAULT_BYPASS_MIN_FEE_MSG_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_bypass_min_fee_msg_gas_usage: DEFAULT_MAX_BYPASS_MIN_FEE_MSG_GAS_USAGE,
        }
    }
}

impl FeePolicy {
    /// True when every message type is allow-listed and the gas limit is
    /// within the bypass ceiling.
    pub fn allows_bypass<'a>(&self, msg_types: impl IntoIterator<Item = &'a str>, gas: u64) -> bool {
        let mut any = false;
        for msg_type in msg_types {
            any = true;
            if !self.bypass_min_fee_msg_types.iter().any(|t| t == msg_type) {
                return false;
            }
        }
        any && gas <= self.max_bypass_min_fee_msg_gas_usage
    }
}
