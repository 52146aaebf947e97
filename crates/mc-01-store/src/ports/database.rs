use crate::domain::{StoreError, StoreKey};
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Key/value pairs returned by prefix iteration, sorted by key.
pub type KvPairs = Vec<(Vec<u8>, Vec<u8>)>;

/// Identifier of a committed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CommitId {
    pub version: u64,
    pub hash: Hash,
}

/// Storage boundary: the external multi-version key-value store.
///
/// Partitions are addressed by name. Reads without a version see the
/// working set on top of the latest commit. `commit` must be atomic and
/// `load_at_version` must leave a fully consistent historical state.
pub trait VersionedStore: Send + Sync {
    fn get(&self, partition: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, partition: &str, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;
    fn delete(&mut self, partition: &str, key: &[u8]) -> Result<(), StoreError>;
    fn iter_prefix(&self, partition: &str, prefix: &[u8]) -> Result<KvPairs, StoreError>;

    /// Finalize the working set into version `latest + 1`.
    fn commit(&mut self) -> Result<CommitId, StoreError>;
    /// Discard uncommitted writes and every version above `version`.
    fn load_at_version(&mut self, version: u64) -> Result<(), StoreError>;
    /// Discard uncommitted writes.
    fn discard_working(&mut self);

    fn get_at(
        &self,
        version: u64,
        partition: &str,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, StoreError>;
    fn iter_prefix_at(
        &self,
        version: u64,
        partition: &str,
        prefix: &[u8],
    ) -> Result<KvPairs, StoreError>;

    fn latest_version(&self) -> u64;
    fn last_commit(&self) -> CommitId;
    /// Root the store would commit to if `commit` were called now.
    fn working_hash(&self) -> Hash;
}

/// Key/value access routed by [`StoreKey`].
///
/// Implemented by the root multistore, cache branches and read-only
/// snapshots, so execution code never needs to know which one it has.
pub trait StoreBackend {
    fn get(&self, store: &StoreKey, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, store: &StoreKey, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;
    fn delete(&mut self, store: &StoreKey, key: &[u8]) -> Result<(), StoreError>;
    fn iter_prefix(&self, store: &StoreKey, prefix: &[u8]) -> Result<KvPairs, StoreError>;

    fn has(&self, store: &StoreKey, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(store, key)?.is_some())
    }
}
