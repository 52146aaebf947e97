//! # Store Keys and Partition Allocation
//!
//! A [`StoreKey`] is the only way to reach a partition. Keys cannot be built
//! outside this module: the [`PartitionManager`] mints them, checks names
//! for uniqueness within each class, and stops minting once sealed.

use super::StoreError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Durability class of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKind {
    /// Versioned, committed at the end of every block.
    Persistent,
    /// Scratch space cleared at begin-block and at commit.
    Transient,
    /// Process-local; never persisted.
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::Transient => "transient",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle naming one partition.
///
/// Cloning is cheap. Two keys are equal only if they were minted by the same
/// allocation, so a key with a reused name from another manager does not
/// alias a mounted partition.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    manager: u64,
    kind: StoreKind,
    name: Arc<str>,
    id: u32,
}

impl StoreKey {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({}:{}#{})", self.kind, self.name, self.id)
    }
}

static NEXT_MANAGER: AtomicU64 = AtomicU64::new(1);

/// Allocates disjoint partitions and mints their keys.
#[derive(Debug)]
pub struct PartitionManager {
    instance: u64,
    allocated: BTreeMap<(StoreKind, String), StoreKey>,
    next_id: u32,
    sealed: bool,
}

impl Default for PartitionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionManager {
    pub fn new() -> Self {
        Self {
            instance: NEXT_MANAGER.fetch_add(1, Ordering::Relaxed),
            allocated: BTreeMap::new(),
            next_id: 0,
            sealed: false,
        }
    }

    /// Allocate one key per name in `kind`.
    ///
    /// The whole request fails if any name is invalid, already allocated in
    /// this class, or repeated within `names`; nothing is allocated then.
    pub fn allocate(
        &mut self,
        kind: StoreKind,
        names: &[&str],
    ) -> Result<BTreeMap<String, StoreKey>, StoreError> {
        let mut requested: BTreeMap<String, ()> = BTreeMap::new();
        for name in names {
            if self.sealed {
                return Err(StoreError::Sealed {
                    name: (*name).to_string(),
                });
            }
            validate_name(name)?;
            let duplicate = self.allocated.contains_key(&(kind, (*name).to_string()))
                || requested.insert((*name).to_string(), ()).is_some();
            if duplicate {
                return Err(StoreError::DuplicateKey {
                    name: (*name).to_string(),
                    kind: kind.to_string(),
                });
            }
        }

        let mut keys = BTreeMap::new();
        for name in names {
            let key = StoreKey {
                manager: self.instance,
                kind,
                name: Arc::from(*name),
                id: self.next_id,
            };
            self.next_id += 1;
            debug!(kind = %kind, name = %name, id = key.id, "[Store] allocated partition");
            self.allocated.insert((kind, (*name).to_string()), key.clone());
            keys.insert((*name).to_string(), key);
        }
        Ok(keys)
    }

    /// Allocate a single key.
    pub fn allocate_one(&mut self, kind: StoreKind, name: &str) -> Result<StoreKey, StoreError> {
        self.allocate(kind, &[name])?
            .remove(name)
            .ok_or_else(|| StoreError::InvalidName(name.to_string()))
    }

    pub fn get(&self, kind: StoreKind, name: &str) -> Option<&StoreKey> {
        self.allocated.get(&(kind, name.to_string()))
    }

    /// Stop further allocation and return every key for mounting, in
    /// allocation order.
    pub fn seal(&mut self) -> Vec<StoreKey> {
        self.sealed = true;
        let mut keys: Vec<StoreKey> = self.allocated.values().cloned().collect();
        keys.sort_by_key(StoreKey::id);
        keys
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

/// Names are ASCII `[a-z0-9_]` so partition prefixes never need escaping.
fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
