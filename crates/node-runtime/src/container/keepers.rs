//! # Keeper Container
//!
//! Allocates every storage partition, validates the keeper dependency
//! graph and constructs the keepers in dependency order. Each keeper
//! receives only its own store keys and port handles to the keepers it
//! declared.

use super::{AppConfig, KeeperGraph};
use crate::adapters::{AuthAdapter, BankAdapter};
use mc_01_store::{MultiStore, PartitionManager, StoreKey, StoreKind, VersionedStore};
use mc_03_params::ParamsKeeper;
use mc_04_auth::AuthKeeper;
use mc_05_bank::BankKeeper;
use mc_06_staking::StakingKeeper;
use mc_07_capability::CapabilityKeeper;
use shared_types::{module_names, FatalError};
use std::sync::Arc;
use tracing::info;

/// Partition names. The auth partition keeps the historical `acc` name.
pub mod store_names {
    pub const ACC: &str = "acc";
    pub const BANK: &str = "bank";
    pub const STAKING: &str = "staking";
    pub const PARAMS: &str = "params";
    pub const CAPABILITY: &str = "capability";
    pub const TRANSIENT_PARAMS: &str = "transient_params";
    pub const MEMORY_CAPABILITY: &str = "memory_capability";
}

/// Every key handed out at construction.
#[derive(Debug, Clone)]
pub struct StoreKeys {
    pub acc: StoreKey,
    pub bank: StoreKey,
    pub staking: StoreKey,
    pub params: StoreKey,
    pub capability: StoreKey,
    pub transient_params: StoreKey,
    pub memory_capability: StoreKey,
}

impl StoreKeys {
    fn allocate(partitions: &mut PartitionManager) -> Result<Self, FatalError> {
        use store_names::*;
        let mut persistent =
            partitions.allocate(StoreKind::Persistent, &[ACC, BANK, STAKING, PARAMS, CAPABILITY])?;
        let transient_params = partitions.allocate_one(StoreKind::Transient, TRANSIENT_PARAMS)?;
        let memory_capability = partitions.allocate_one(StoreKind::Memory, MEMORY_CAPABILITY)?;
        let mut take = |name: &str| {
            persistent
                .remove(name)
                .ok_or_else(|| FatalError::UnmountedStore {
                    name: name.to_string(),
                })
        };
        Ok(Self {
            acc: take(ACC)?,
            bank: take(BANK)?,
            staking: take(STAKING)?,
            params: take(PARAMS)?,
            capability: take(CAPABILITY)?,
            transient_params,
            memory_capability,
        })
    }
}

pub struct KeeperContainer {
    pub keys: StoreKeys,
    pub params: Arc<ParamsKeeper>,
    pub auth: Arc<AuthKeeper>,
    pub bank: Arc<BankKeeper>,
    pub staking: Arc<StakingKeeper>,
    pub capability: Arc<CapabilityKeeper>,
    mounted: Vec<StoreKey>,
    construction_order: Vec<&'static str>,
}

/// The dependency graph of the built-in keepers.
pub fn keeper_graph() -> Result<KeeperGraph, FatalError> {
    KeeperGraph::new()
        .with(ParamsKeeper::keeper_info())?
        .with(AuthKeeper::keeper_info())?
        .with(BankKeeper::keeper_info())?
        .with(StakingKeeper::keeper_info())?
        .with(CapabilityKeeper::keeper_info())
}

fn require<T>(slot: &Option<Arc<T>>, keeper: &str, dependency: &str) -> Result<Arc<T>, FatalError> {
    slot.clone().ok_or_else(|| FatalError::UnregisteredDependency {
        keeper: keeper.to_string(),
        dependency: dependency.to_string(),
    })
}

impl KeeperContainer {
    pub fn new(config: &AppConfig) -> Result<Self, FatalError> {
        let construction_order = keeper_graph()?.topological_order()?;

        let mut partitions = PartitionManager::new();
        let keys = StoreKeys::allocate(&mut partitions)?;
        let mounted = partitions.seal();

        let mut params: Option<Arc<ParamsKeeper>> = None;
        let mut auth: Option<Arc<AuthKeeper>> = None;
        let mut bank: Option<Arc<BankKeeper>> = None;
        let mut staking: Option<Arc<StakingKeeper>> = None;
        let mut capability: Option<Arc<CapabilityKeeper>> = None;

        for &name in &construction_order {
            match name {
                module_names::PARAMS => {
                    params = Some(Arc::new(ParamsKeeper::new(
                        keys.params.clone(),
                        keys.transient_params.clone(),
                    )));
                }
                module_names::AUTH => {
                    let params = require(&params, name, module_names::PARAMS)?;
                    auth = Some(Arc::new(AuthKeeper::new(
                        keys.acc.clone(),
                        params.subspace(module_names::AUTH)?,
                        config.module_account_permissions.clone(),
                    )?));
                }
                module_names::BANK => {
                    let params = require(&params, name, module_names::PARAMS)?;
                    let auth = require(&auth, name, module_names::AUTH)?;
                    let blocked = auth.module_account_addresses();
                    bank = Some(Arc::new(BankKeeper::new(
                        keys.bank.clone(),
                        params.subspace(module_names::BANK)?,
                        Arc::new(AuthAdapter::new(auth)),
                        blocked,
                    )?));
                }
                module_names::STAKING => {
                    let params = require(&params, name, module_names::PARAMS)?;
                    let auth = require(&auth, name, module_names::AUTH)?;
                    let bank = require(&bank, name, module_names::BANK)?;
                    staking = Some(Arc::new(StakingKeeper::new(
                        keys.staking.clone(),
                        params.subspace(module_names::STAKING)?,
                        Arc::new(AuthAdapter::new(auth)),
                        Arc::new(BankAdapter::new(bank)),
                    )?));
                }
                module_names::CAPABILITY => {
                    capability = Some(Arc::new(CapabilityKeeper::new(
                        keys.capability.clone(),
                        keys.memory_capability.clone(),
                    )));
                }
                other => {
                    return Err(FatalError::Config(format!("no constructor for keeper {other}")));
                }
            }
        }

        let capability = require(&capability, "container", module_names::CAPABILITY)?;
        // No built-in module claims capabilities; sealing now forbids late scopes.
        capability.seal()?;

        info!(
            order = ?construction_order,
            partitions = mounted.len(),
            "[Container] keepers constructed"
        );
        Ok(Self {
            params: require(&params, "container", module_names::PARAMS)?,
            auth: require(&auth, "container", module_names::AUTH)?,
            bank: require(&bank, "container", module_names::BANK)?,
            staking: require(&staking, "container", module_names::STAKING)?,
            capability,
            keys,
            mounted,
            construction_order,
        })
    }

    /// Mount every allocated partition over `backend`.
    pub fn mount(&self, backend: Box<dyn VersionedStore>) -> Result<MultiStore, FatalError> {
        Ok(MultiStore::new(backend, self.mounted.iter().cloned())?)
    }

    pub fn mounted_keys(&self) -> &[StoreKey] {
        &self.mounted
    }

    pub fn construction_order(&self) -> &[&'static str] {
        &self.construction_order
    }
}
