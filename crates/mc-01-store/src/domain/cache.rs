//! # Cache Branches
//!
//! A [`CacheMultiStore`] buffers writes over any [`StoreBackend`]. Reads see
//! the buffer first. `write()` flushes the buffer to the parent in key
//! order; dropping the branch discards it. Branches nest, so a message can
//! run inside a transaction branch and fail without touching the fee
//! writes made before it.

use super::{StoreError, StoreKey, StoreKind};
use crate::ports::{KvPairs, StoreBackend};
use std::collections::BTreeMap;

/// Buffered writes; `None` marks a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet(BTreeMap<StoreKey, BTreeMap<Vec<u8>, Option<Vec<u8>>>>);

impl WriteSet {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    /// Number of buffered writes to persistent partitions.
    pub fn persistent_len(&self) -> usize {
        self.0
            .iter()
            .filter(|(k, _)| k.kind() == StoreKind::Persistent)
            .map(|(_, w)| w.len())
            .sum()
    }

    fn lookup(&self, store: &StoreKey, key: &[u8]) -> Option<&Option<Vec<u8>>> {
        self.0.get(store).and_then(|w| w.get(key))
    }

    fn record(&mut self, store: &StoreKey, key: &[u8], value: Option<Vec<u8>>) {
        self.0
            .entry(store.clone())
            .or_default()
            .insert(key.to_vec(), value);
    }

    /// Apply every buffered write to `target`.
    pub fn apply_to(self, target: &mut dyn StoreBackend) -> Result<(), StoreError> {
        for (store, writes) in self.0 {
            for (key, value) in writes {
                match value {
                    Some(v) => target.set(&store, &key, v)?,
                    None => target.delete(&store, &key)?,
                }
            }
        }
        Ok(())
    }
}

pub struct CacheMultiStore<'p> {
    parent: &'p mut dyn StoreBackend,
    writes: WriteSet,
}

impl<'p> CacheMultiStore<'p> {
    pub fn new(parent: &'p mut dyn StoreBackend) -> Self {
        Self {
            parent,
            writes: WriteSet::default(),
        }
    }

    /// Resume a branch from writes buffered earlier.
    pub fn with_writes(parent: &'p mut dyn StoreBackend, writes: WriteSet) -> Self {
        Self { parent, writes }
    }

    /// Flush buffered writes to the parent.
    pub fn write(self) -> Result<(), StoreError> {
        self.writes.apply_to(self.parent)
    }

    /// Release the parent and keep the buffered writes.
    pub fn into_writes(self) -> WriteSet {
        self.writes
    }

    pub fn writes(&self) -> &WriteSet {
        &self.writes
    }
}

impl StoreBackend for CacheMultiStore<'_> {
    fn get(&self, store: &StoreKey, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.lookup(store, key) {
            Some(value) => Ok(value.clone()),
            None => self.parent.get(store, key),
        }
    }

    fn set(&mut self, store: &StoreKey, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        // Validate the handle against the parent before buffering.
        self.parent.get(store, key)?;
        self.writes.record(store, key, Some(value));
        Ok(())
    }

    fn delete(&mut self, store: &StoreKey, key: &[u8]) -> Result<(), StoreError> {
        self.parent.get(store, key)?;
        self.writes.record(store, key, None);
        Ok(())
    }

    fn iter_prefix(&self, store: &StoreKey, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        let mut view: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.iter_prefix(store, prefix)?.into_iter().collect();
        if let Some(writes) = self.writes.0.get(store) {
            for (key, value) in writes.iter().filter(|(k, _)| k.starts_with(prefix)) {
                match value {
                    Some(v) => {
                        view.insert(key.clone(), v.clone());
                    }
                    None => {
                        view.remove(key);
                    }
                }
            }
        }
        Ok(view.into_iter().collect())
    }
}
