//! # Application Configuration
//!
//! Static configuration supplied at construction. Nothing here is read from
//! chain state; parameters that governance may change live in the params
//! subspaces instead.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MC_CHAIN_ID` | `chain_id` |
//! | `MC_MIN_GAS_PRICES` | `ante.min_gas_prices` (e.g. `0.025stake`) |
//! | `MC_BYPASS_MIN_FEE_MSG_TYPES` | `ante.bypass_min_fee_msg_types` (comma separated) |
//! | `MC_MAX_BYPASS_GAS` | `ante.max_bypass_min_fee_msg_gas_usage` |
//! | `MC_BLOCK_TIME_MS` | `devnet.block_time_ms` |

use crate::registry::{ModuleOrders, OrderConstraint};
use mc_09_ante::{FeePolicy, GasPrices};
use shared_types::{module_names, FatalError, ModuleAccountPermissions, Permission};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub const DEFAULT_CHAIN_ID: &str = "modular-1";
pub const DEFAULT_MIN_GAS_PRICES: &str = "0stake";

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Chain identifier bound into every sign document.
    pub chain_id: String,
    /// Module name to the permissions its module account holds.
    pub module_account_permissions: ModuleAccountPermissions,
    /// Lifecycle orders of every phase.
    pub orders: ModuleOrders,
    /// Pairwise ordering requirements checked against `orders`.
    pub constraints: Vec<OrderConstraint>,
    /// Node-local admission policy.
    pub ante: FeePolicy,
    /// Local block production for the devnet binary.
    pub devnet: DevnetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            module_account_permissions: default_module_account_permissions(),
            orders: ModuleOrders::default(),
            constraints: OrderConstraint::defaults(),
            ante: FeePolicy {
                min_gas_prices: DEFAULT_MIN_GAS_PRICES.parse().unwrap_or_default(),
                ..FeePolicy::default()
            },
            devnet: DevnetConfig::default(),
        }
    }
}

/// Devnet block production.
#[derive(Debug, Clone)]
pub struct DevnetConfig {
    /// Interval between produced blocks.
    pub block_time_ms: u64,
    /// Denomination of the bootstrap validator's stake.
    pub bond_denom: String,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            block_time_ms: 1_000,
            bond_denom: "stake".to_string(),
        }
    }
}

/// Fee collector holds fees only; both staking pools may burn and hold
/// delegated stake.
pub fn default_module_account_permissions() -> ModuleAccountPermissions {
    let staking: BTreeSet<Permission> = [Permission::Burner, Permission::Staking].into();
    [
        (module_names::FEE_COLLECTOR.to_string(), BTreeSet::new()),
        (module_names::BONDED_POOL.to_string(), staking.clone()),
        (module_names::NOT_BONDED_POOL.to_string(), staking),
    ]
    .into()
}

impl AppConfig {
    /// Defaults with environment overrides applied. Unparseable values are
    /// errors rather than silently ignored.
    pub fn from_env() -> Result<Self, FatalError> {
        let mut config = Self::default();
        if let Ok(chain_id) = std::env::var("MC_CHAIN_ID") {
            config.chain_id = chain_id;
        }
        if let Ok(prices) = std::env::var("MC_MIN_GAS_PRICES") {
            config.ante.min_gas_prices = prices
                .parse::<GasPrices>()
                .map_err(|e| FatalError::Config(format!("MC_MIN_GAS_PRICES: {e}")))?;
        }
        if let Ok(types) = std::env::var("MC_BYPASS_MIN_FEE_MSG_TYPES") {
            config.ante.bypass_min_fee_msg_types = types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(gas) = std::env::var("MC_MAX_BYPASS_GAS") {
            config.ante.max_bypass_min_fee_msg_gas_usage = parse_number("MC_MAX_BYPASS_GAS", &gas)?;
        }
        if let Ok(ms) = std::env::var("MC_BLOCK_TIME_MS") {
            config.devnet.block_time_ms = parse_number("MC_BLOCK_TIME_MS", &ms)?;
        }
        config.validate()?;
        info!(
            chain_id = %config.chain_id,
            min_gas_prices = %config.ante.min_gas_prices,
            "[Config] configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FatalError> {
        if self.chain_id.trim().is_empty() {
            return Err(FatalError::Config("chain id must not be empty".into()));
        }
        for module in [
            module_names::FEE_COLLECTOR,
            module_names::BONDED_POOL,
            module_names::NOT_BONDED_POOL,
        ] {
            if !self.module_account_permissions.contains_key(module) {
                return Err(FatalError::MissingModulePermission {
                    module: module.to_string(),
                });
            }
        }
        if self.devnet.block_time_ms == 0 {
            return Err(FatalError::Config("block time must be positive".into()));
        }
        if self.ante.min_gas_prices.is_zero() && !self.ante.bypass_min_fee_msg_types.is_empty() {
            warn!("[Config] bypass message types configured without minimum gas prices");
        }
        Ok(())
    }
}

fn parse_number(var: &str, raw: &str) -> Result<u64, FatalError> {
    raw.trim()
        .parse()
        .map_err(|_| FatalError::Config(format!("{var}: expected an integer, got {raw:?}")))
}
