use super::{MultiStore, StoreError, StoreKey, StoreKind};
use crate::ports::{KvPairs, StoreBackend, VersionedStore};
use std::collections::BTreeMap;

/// Read-only view of committed state at one version.
///
/// Transient and memory partitions read as empty. Every write fails with
/// [`StoreError::ReadOnly`]; wrap it in a [`super::CacheMultiStore`] to
/// simulate execution without touching committed state.
pub struct SnapshotStore<'a> {
    store: &'a dyn VersionedStore,
    mounted: &'a BTreeMap<u32, StoreKey>,
    version: u64,
}

impl<'a> SnapshotStore<'a> {
    pub(crate) fn new(
        store: &'a dyn VersionedStore,
        mounted: &'a BTreeMap<u32, StoreKey>,
        version: u64,
    ) -> Result<Self, StoreError> {
        if version > store.latest_version() {
            return Err(StoreError::VersionNotFound {
                version,
                latest: store.latest_version(),
            });
        }
        Ok(Self {
            store,
            mounted,
            version,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl StoreBackend for SnapshotStore<'_> {
    fn get(&self, store: &StoreKey, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        MultiStore::check_mounted(self.mounted, store)?;
        match store.kind() {
            StoreKind::Persistent => self.store.get_at(self.version, store.name(), key),
            _ => Ok(None),
        }
    }

    fn set(&mut self, store: &StoreKey, _key: &[u8], _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly {
            name: store.name().to_string(),
        })
    }

    fn delete(&mut self, store: &StoreKey, _key: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly {
            name: store.name().to_string(),
        })
    }

    fn iter_prefix(&self, store: &StoreKey, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        MultiStore::check_mounted(self.mounted, store)?;
        match store.kind() {
            StoreKind::Persistent => self.store.iter_prefix_at(self.version, store.name(), prefix),
            _ => Ok(Vec::new()),
        }
    }
}
