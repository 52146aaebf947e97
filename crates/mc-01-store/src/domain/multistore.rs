//! # Root Multistore
//!
//! Mounts every allocated [`StoreKey`] and routes access by class:
//! persistent keys go to the [`VersionedStore`] under the partition name,
//! transient and memory keys go to process-local maps.

use super::{SnapshotStore, StoreError, StoreKey, StoreKind};
use crate::ports::{CommitId, KvPairs, StoreBackend, VersionedStore};
use shared_types::Hash;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::{debug, info};

type Partition = BTreeMap<Vec<u8>, Vec<u8>>;

pub struct MultiStore {
    persistent: Box<dyn VersionedStore>,
    local: BTreeMap<u32, Partition>,
    mounted: BTreeMap<u32, StoreKey>,
}

impl MultiStore {
    /// Mount `keys` over `persistent`. Every key must be distinct.
    pub fn new(
        persistent: Box<dyn VersionedStore>,
        keys: impl IntoIterator<Item = StoreKey>,
    ) -> Result<Self, StoreError> {
        let mut mounted = BTreeMap::new();
        let mut local = BTreeMap::new();
        for key in keys {
            if key.kind() != StoreKind::Persistent {
                local.insert(key.id(), Partition::new());
            }
            if let Some(previous) = mounted.insert(key.id(), key) {
                return Err(StoreError::DuplicateKey {
                    name: previous.name().to_string(),
                    kind: previous.kind().to_string(),
                });
            }
        }
        info!(mounted = mounted.len(), "[Store] multistore mounted");
        Ok(Self {
            persistent,
            local,
            mounted,
        })
    }

    pub fn mounted_keys(&self) -> impl Iterator<Item = &StoreKey> {
        self.mounted.values()
    }

    pub(crate) fn check_mounted(
        mounted: &BTreeMap<u32, StoreKey>,
        store: &StoreKey,
    ) -> Result<(), StoreError> {
        match mounted.get(&store.id()) {
            Some(k) if k == store => Ok(()),
            _ => Err(StoreError::NotMounted {
                name: store.name().to_string(),
            }),
        }
    }

    /// Finalize persistent writes into a new version and clear transient
    /// partitions.
    pub fn commit(&mut self) -> Result<CommitId, StoreError> {
        let id = self.persistent.commit()?;
        self.reset_transient();
        Ok(id)
    }

    /// Clear every transient partition.
    pub fn reset_transient(&mut self) {
        for key in self.mounted.values() {
            if key.kind() == StoreKind::Transient {
                if let Some(p) = self.local.get_mut(&key.id()) {
                    p.clear();
                }
            }
        }
    }

    /// Clear every memory partition; callers rebuild them from persistent
    /// state afterwards.
    pub fn reset_memory(&mut self) {
        for key in self.mounted.values() {
            if key.kind() == StoreKind::Memory {
                if let Some(p) = self.local.get_mut(&key.id()) {
                    p.clear();
                }
            }
        }
    }

    /// Roll persistent state back to `version` and drop all uncommitted and
    /// process-local state.
    pub fn load_version(&mut self, version: u64) -> Result<(), StoreError> {
        self.persistent.load_at_version(version)?;
        self.reset_transient();
        self.reset_memory();
        debug!(version, "[Store] multistore loaded version");
        Ok(())
    }

    /// Drop uncommitted persistent writes and transient state.
    pub fn discard_working(&mut self) {
        self.persistent.discard_working();
        self.reset_transient();
    }

    pub fn last_commit(&self) -> CommitId {
        self.persistent.last_commit()
    }

    pub fn latest_version(&self) -> u64 {
        self.persistent.latest_version()
    }

    pub fn working_hash(&self) -> Hash {
        self.persistent.working_hash()
    }

    /// Read-only view of committed state at `version` (latest if `None`).
    pub fn snapshot(&self, version: Option<u64>) -> Result<SnapshotStore<'_>, StoreError> {
        let version = version.unwrap_or_else(|| self.persistent.latest_version());
        SnapshotStore::new(self.persistent.as_ref(), &self.mounted, version)
    }
}

impl StoreBackend for MultiStore {
    fn get(&self, store: &StoreKey, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Self::check_mounted(&self.mounted, store)?;
        match store.kind() {
            StoreKind::Persistent => self.persistent.get(store.name(), key),
            _ => Ok(self
                .local
                .get(&store.id())
                .and_then(|p| p.get(key))
                .cloned()),
        }
    }

    fn set(&mut self, store: &StoreKey, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        Self::check_mounted(&self.mounted, store)?;
        match store.kind() {
            StoreKind::Persistent => self.persistent.set(store.name(), key, value),
            _ => {
                self.local
                    .entry(store.id())
                    .or_default()
                    .insert(key.to_vec(), value);
                Ok(())
            }
        }
    }

    fn delete(&mut self, store: &StoreKey, key: &[u8]) -> Result<(), StoreError> {
        Self::check_mounted(&self.mounted, store)?;
        match store.kind() {
            StoreKind::Persistent => self.persistent.delete(store.name(), key),
            _ => {
                if let Some(p) = self.local.get_mut(&store.id()) {
                    p.remove(key);
                }
                Ok(())
            }
        }
    }

    fn iter_prefix(&self, store: &StoreKey, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        Self::check_mounted(&self.mounted, store)?;
        match store.kind() {
            StoreKind::Persistent => self.persistent.iter_prefix(store.name(), prefix),
            _ => Ok(self
                .local
                .get(&store.id())
                .map(|p| {
                    p.range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
                        .take_while(|(k, _)| k.starts_with(prefix))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default()),
        }
    }
}
