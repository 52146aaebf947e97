use crate::{CapabilityError, CapabilityOwners, ScopedKeeper};
use mc_01_store::{decode, StoreKey};
use mc_02_module::{Context, KeeperInfo, ModuleError};
use parking_lot::RwLock;
use shared_types::{module_names, FatalError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

const INDEX_KEY: &[u8] = &[0x00];
const OWNERS_PREFIX: u8 = 0x01;

const MEM_INITIALIZED_KEY: &[u8] = &[0x00];
const FORWARD_PREFIX: u8 = 0x01;
const REVERSE_PREFIX: u8 = 0x02;

fn owners_key(index: u64) -> Vec<u8> {
    let mut key = vec![OWNERS_PREFIX];
    key.extend_from_slice(&index.to_be_bytes());
    key
}

pub(crate) fn forward_key(module: &str, index: u64) -> Vec<u8> {
    let mut key = vec![FORWARD_PREFIX];
    key.extend_from_slice(module.as_bytes());
    key.push(b'/');
    key.extend_from_slice(&index.to_be_bytes());
    key
}

pub(crate) fn reverse_key(module: &str, name: &str) -> Vec<u8> {
    let mut key = vec![REVERSE_PREFIX];
    key.extend_from_slice(module.as_bytes());
    key.push(b'/');
    key.extend_from_slice(name.as_bytes());
    key
}

/// The two partitions every scoped keeper works on.
#[derive(Debug)]
pub(crate) struct CapabilityStores {
    pub persistent: StoreKey,
    pub memory: StoreKey,
}

impl CapabilityStores {
    pub fn latest_index(&self, ctx: &mut Context<'_>) -> Result<u64, CapabilityError> {
        Ok(ctx.kv(&self.persistent).get_typed(INDEX_KEY)?.unwrap_or(1))
    }

    pub fn set_index(&self, ctx: &mut Context<'_>, index: u64) -> Result<(), CapabilityError> {
        Ok(ctx.kv(&self.persistent).set_typed(INDEX_KEY, &index)?)
    }

    pub fn owners(&self, ctx: &mut Context<'_>, index: u64) -> Result<Option<CapabilityOwners>, CapabilityError> {
        Ok(ctx.kv(&self.persistent).get_typed(&owners_key(index))?)
    }

    pub fn set_owners(
        &self,
        ctx: &mut Context<'_>,
        index: u64,
        owners: &CapabilityOwners,
    ) -> Result<(), CapabilityError> {
        let mut kv = ctx.kv(&self.persistent);
        if owners.is_empty() {
            kv.delete(&owners_key(index))?;
        } else {
            kv.set_typed(&owners_key(index), owners)?;
        }
        Ok(())
    }

    pub fn all_owners(&self, ctx: &mut Context<'_>) -> Result<Vec<(u64, CapabilityOwners)>, CapabilityError> {
        let entries = ctx.kv(&self.persistent).iter_prefix(&[OWNERS_PREFIX])?;
        let mut out = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let index = key
                .get(1..9)
                .and_then(|b| <[u8; 8]>::try_from(b).ok())
                .map(u64::from_be_bytes)
                .ok_or_else(|| ModuleError::decode("capability owners key", format!("{key:?}")))?;
            out.push((index, decode(&value)?));
        }
        Ok(out)
    }

    pub fn map(&self, ctx: &mut Context<'_>, module: &str, name: &str, index: u64) -> Result<(), CapabilityError> {
        let mut kv = ctx.kv(&self.memory);
        kv.set(&forward_key(module, index), name.as_bytes().to_vec())?;
        kv.set(&reverse_key(module, name), index.to_be_bytes().to_vec())?;
        Ok(())
    }

    pub fn unmap(&self, ctx: &mut Context<'_>, module: &str, name: &str, index: u64) -> Result<(), CapabilityError> {
        let mut kv = ctx.kv(&self.memory);
        kv.delete(&forward_key(module, index))?;
        kv.delete(&reverse_key(module, name))?;
        Ok(())
    }

    pub fn name_of(&self, ctx: &mut Context<'_>, module: &str, index: u64) -> Result<Option<String>, CapabilityError> {
        Ok(ctx
            .kv(&self.memory)
            .get(&forward_key(module, index))?
            .map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    pub fn index_of(&self, ctx: &mut Context<'_>, module: &str, name: &str) -> Result<Option<u64>, CapabilityError> {
        Ok(ctx
            .kv(&self.memory)
            .get(&reverse_key(module, name))?
            .and_then(|b| <[u8; 8]>::try_from(b.as_slice()).ok())
            .map(u64::from_be_bytes))
    }
}

#[derive(Debug, Default)]
struct ScopeRegistry {
    modules: BTreeSet<String>,
    sealed: bool,
}

/// Owner of the `capability` and `memory_capability` partitions.
pub struct CapabilityKeeper {
    stores: Arc<CapabilityStores>,
    scopes: RwLock<ScopeRegistry>,
}

impl CapabilityKeeper {
    pub fn new(persistent: StoreKey, memory: StoreKey) -> Self {
        Self {
            stores: Arc::new(CapabilityStores { persistent, memory }),
            scopes: RwLock::new(ScopeRegistry::default()),
        }
    }

    pub fn keeper_info() -> KeeperInfo {
        KeeperInfo::new(module_names::CAPABILITY, &[])
    }

    /// Hand out the scoped keeper of `module`. Each module gets exactly one
    /// and none are handed out after sealing.
    pub fn scope_to_module(&self, module: &str) -> Result<ScopedKeeper, FatalError> {
        let mut scopes = self.scopes.write();
        if scopes.sealed {
            return Err(FatalError::CapabilitySealed);
        }
        if !scopes.modules.insert(module.to_string()) {
            return Err(FatalError::DuplicateScope {
                module: module.to_string(),
            });
        }
        debug!(module, "[Capability] scoped keeper created");
        Ok(ScopedKeeper::new(module.to_string(), self.stores.clone()))
    }

    /// Forbid further scoped keepers. Sealing twice is an error.
    pub fn seal(&self) -> Result<(), FatalError> {
        let mut scopes = self.scopes.write();
        if scopes.sealed {
            return Err(FatalError::CapabilitySealed);
        }
        scopes.sealed = true;
        info!(scopes = scopes.modules.len(), "[Capability] keeper sealed");
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.scopes.read().sealed
    }

    pub fn scoped_modules(&self) -> Vec<String> {
        self.scopes.read().modules.iter().cloned().collect()
    }

    pub fn latest_index(&self, ctx: &mut Context<'_>) -> Result<u64, CapabilityError> {
        self.stores.latest_index(ctx)
    }

    /// Set the next capability index. Only valid before any capability
    /// exists.
    pub fn initialize_index(&self, ctx: &mut Context<'_>, index: u64) -> Result<(), CapabilityError> {
        if index == 0 {
            return Err(CapabilityError::InvalidGenesis("index must be positive".into()));
        }
        if !self.stores.all_owners(ctx)?.is_empty() {
            return Err(CapabilityError::InvalidGenesis(
                "index cannot change once capabilities exist".into(),
            ));
        }
        self.stores.set_index(ctx, index)
    }

    pub fn owners(&self, ctx: &mut Context<'_>, index: u64) -> Result<Option<CapabilityOwners>, CapabilityError> {
        self.stores.owners(ctx, index)
    }

    pub fn set_owners(
        &self,
        ctx: &mut Context<'_>,
        index: u64,
        owners: &CapabilityOwners,
    ) -> Result<(), CapabilityError> {
        self.stores.set_owners(ctx, index, owners)
    }

    pub fn all_owners(&self, ctx: &mut Context<'_>) -> Result<Vec<(u64, CapabilityOwners)>, CapabilityError> {
        self.stores.all_owners(ctx)
    }

    pub fn is_memory_initialized(&self, ctx: &mut Context<'_>) -> Result<bool, CapabilityError> {
        Ok(ctx.kv(&self.stores.memory).has(MEM_INITIALIZED_KEY)?)
    }

    /// Rebuild the forward and reverse tables from the persistent owners.
    /// Does nothing once the memory partition is initialized.
    pub fn init_memory_store(&self, ctx: &mut Context<'_>) -> Result<(), CapabilityError> {
        if self.is_memory_initialized(ctx)? {
            return Ok(());
        }
        let all = self.stores.all_owners(ctx)?;
        for (index, owners) in &all {
            for owner in &owners.owners {
                self.stores.map(ctx, &owner.module, &owner.name, *index)?;
            }
        }
        ctx.kv(&self.stores.memory).set(MEM_INITIALIZED_KEY, vec![1])?;
        info!(capabilities = all.len(), "[Capability] memory store initialized");
        Ok(())
    }
}
