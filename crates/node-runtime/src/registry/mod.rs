//! # Module Manager
//!
//! Holds every registered [`AppModule`] and drives them through the
//! lifecycle phases in their configured orders.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       ModuleManager                        │
//! │                                                            │
//! │  genesis:     capability → auth → bank → staking → ...     │
//! │  begin_block: capability → staking → auth → ...            │
//! │  end_block:   capability → staking → auth → ...            │
//! │                                                            │
//! │  Hook::Active  → called                                    │
//! │  Hook::NoOp    → keeps its slot, does nothing              │
//! │  Hook::Absent  → must not be listed                        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one module may return validator updates from genesis and from
//! end-block; a second source is fatal because consensus would receive two
//! competing validator sets.

pub mod ordering;

pub use ordering::*;

use mc_02_module::{AppModule, Context, ModuleError};
use serde_json::Value;
use shared_types::{FatalError, ValidatorUpdate};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Genesis sections keyed by module name.
pub type GenesisState = BTreeMap<String, Value>;

pub struct ModuleManager {
    modules: BTreeMap<String, AppModule>,
    orders: ModuleOrders,
}

impl ModuleManager {
    /// Register `modules` and validate `orders` against them.
    pub fn new(
        modules: Vec<AppModule>,
        orders: ModuleOrders,
        constraints: &[OrderConstraint],
    ) -> Result<Self, FatalError> {
        let mut registered = BTreeMap::new();
        for module in modules {
            let name = module.name.clone();
            if registered.insert(name.clone(), module).is_some() {
                return Err(FatalError::DuplicateModule { name });
            }
        }
        for phase in [Phase::Genesis, Phase::BeginBlock, Phase::EndBlock] {
            validate_order(phase, orders.get(phase), &registered)?;
        }
        check_constraints(&orders, constraints)?;
        info!(
            modules = registered.len(),
            genesis = ?orders.genesis,
            begin_block = ?orders.begin_block,
            end_block = ?orders.end_block,
            "[Manager] module orders validated"
        );
        Ok(Self {
            modules: registered,
            orders,
        })
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn modules(&self) -> impl Iterator<Item = &AppModule> {
        self.modules.values()
    }

    pub fn get(&self, name: &str) -> Option<&AppModule> {
        self.modules.get(name)
    }

    pub fn orders(&self) -> &ModuleOrders {
        &self.orders
    }

    /// Consensus version of every module.
    pub fn version_map(&self) -> BTreeMap<String, u64> {
        self.modules
            .iter()
            .map(|(name, m)| (name.clone(), m.consensus_version))
            .collect()
    }

    pub fn default_genesis(&self) -> GenesisState {
        self.modules
            .iter()
            .filter_map(|(name, m)| {
                m.genesis
                    .active()
                    .map(|g| (name.clone(), g.default_genesis()))
            })
            .collect()
    }

    /// Stateless validation of every section. Sections for unregistered
    /// modules are rejected.
    pub fn validate_genesis(&self, state: &GenesisState) -> Result<(), FatalError> {
        for name in state.keys() {
            if !self.modules.contains_key(name) {
                return Err(FatalError::UnknownModule {
                    phase: Phase::Genesis.to_string(),
                    name: name.clone(),
                });
            }
        }
        for name in &self.orders.genesis {
            let Some(genesis) = self.modules.get(name).and_then(|m| m.genesis.active()) else {
                continue;
            };
            if let Some(section) = state.get(name) {
                genesis
                    .validate_genesis(section)
                    .map_err(|e| genesis_failure(name, e))?;
            }
        }
        Ok(())
    }

    /// Run every module's genesis in order. A missing section is replaced
    /// by the module's default.
    pub fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &GenesisState,
    ) -> Result<Vec<ValidatorUpdate>, FatalError> {
        let mut collector = UpdateCollector::new(Phase::Genesis);
        for name in &self.orders.genesis {
            let Some(genesis) = self.modules.get(name).and_then(|m| m.genesis.active()) else {
                continue;
            };
            let section = state
                .get(name)
                .cloned()
                .unwrap_or_else(|| genesis.default_genesis());
            debug!(module = %name, "[Manager] init genesis");
            let updates = genesis
                .init_genesis(ctx, &section)
                .map_err(|e| genesis_failure(name, e))?;
            collector.add(name, updates)?;
        }
        Ok(collector.finish())
    }

    pub fn export_genesis(&self, ctx: &mut Context<'_>) -> Result<GenesisState, FatalError> {
        let mut exported = GenesisState::new();
        for name in &self.orders.genesis {
            let Some(genesis) = self.modules.get(name).and_then(|m| m.genesis.active()) else {
                continue;
            };
            let section = genesis
                .export_genesis(ctx)
                .map_err(|e| genesis_failure(name, e))?;
            exported.insert(name.clone(), section);
        }
        Ok(exported)
    }

    pub fn begin_block(&self, ctx: &mut Context<'_>) -> Result<(), FatalError> {
        for name in &self.orders.begin_block {
            if let Some(hook) = self.modules.get(name).and_then(|m| m.begin_block.active()) {
                hook.begin_block(ctx)
                    .map_err(|e| hook_failure(name, Phase::BeginBlock, e))?;
            }
        }
        Ok(())
    }

    pub fn end_block(&self, ctx: &mut Context<'_>) -> Result<Vec<ValidatorUpdate>, FatalError> {
        let mut collector = UpdateCollector::new(Phase::EndBlock);
        for name in &self.orders.end_block {
            if let Some(hook) = self.modules.get(name).and_then(|m| m.end_block.active()) {
                let updates = hook
                    .end_block(ctx)
                    .map_err(|e| hook_failure(name, Phase::EndBlock, e))?;
                collector.add(name, updates)?;
            }
        }
        Ok(collector.finish())
    }
}

/// Enforces a single source of validator updates per phase.
struct UpdateCollector {
    phase: Phase,
    source: Option<String>,
    updates: Vec<ValidatorUpdate>,
}

impl UpdateCollector {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            source: None,
            updates: Vec::new(),
        }
    }

    fn add(&mut self, module: &str, updates: Vec<ValidatorUpdate>) -> Result<(), FatalError> {
        if updates.is_empty() {
            return Ok(());
        }
        if let Some(previous) = &self.source {
            return Err(FatalError::DuplicateValidatorUpdates {
                phase: self.phase.to_string(),
                previous: previous.clone(),
                module: module.to_string(),
            });
        }
        self.source = Some(module.to_string());
        self.updates = updates;
        Ok(())
    }

    fn finish(self) -> Vec<ValidatorUpdate> {
        self.updates
    }
}

fn genesis_failure(module: &str, err: ModuleError) -> FatalError {
    error!(module, error = %err, "[Manager] genesis failed");
    match err {
        ModuleError::Fatal(fatal @ FatalError::Genesis { .. }) => fatal,
        other => FatalError::Genesis {
            module: module.to_string(),
            reason: other.to_string(),
        },
    }
}

fn hook_failure(module: &str, phase: Phase, err: ModuleError) -> FatalError {
    error!(module, phase = %phase, error = %err, "[Manager] lifecycle hook failed");
    FatalError::Hook {
        module: module.to_string(),
        phase: phase.to_string(),
        reason: err.to_string(),
    }
}
