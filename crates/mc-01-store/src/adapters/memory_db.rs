use crate::domain::{empty_root, state_root, StoreError};
use crate::ports::{CommitId, KvPairs, VersionedStore};
use shared_types::Hash;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tracing::debug;

type Partition = BTreeMap<Vec<u8>, Vec<u8>>;
type Snapshot = BTreeMap<String, Partition>;

/// In-memory implementation of [`VersionedStore`].
///
/// Every commit produces an immutable snapshot shared through `Arc`; the
/// uncommitted working set is an overlay where `None` marks a delete.
pub struct InMemoryVersionedStore {
    versions: BTreeMap<u64, (Arc<Snapshot>, Hash)>,
    working: BTreeMap<String, BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
    latest: u64,
    keep_recent: Option<u64>,
}

impl InMemoryVersionedStore {
    pub fn new() -> Self {
        Self {
            versions: BTreeMap::new(),
            working: BTreeMap::new(),
            latest: 0,
            keep_recent: None,
        }
    }

    /// Keep only the `keep_recent` most recent versions.
    pub fn with_pruning(keep_recent: u64) -> Self {
        Self {
            keep_recent: Some(keep_recent.max(1)),
            ..Self::new()
        }
    }

    /// Versions currently available for historical reads.
    pub fn available_versions(&self) -> Vec<u64> {
        self.versions.keys().copied().collect()
    }

    fn committed(&self, version: u64) -> Result<Option<&Arc<Snapshot>>, StoreError> {
        if version == 0 {
            return Ok(None);
        }
        self.versions
            .get(&version)
            .map(|(snap, _)| Some(snap))
            .ok_or(StoreError::VersionNotFound {
                version,
                latest: self.latest,
            })
    }

    fn latest_snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.versions.get(&self.latest).map(|(snap, _)| snap)
    }

    /// Latest snapshot with the working overlay applied.
    fn merged(&self) -> Snapshot {
        let mut out = self
            .latest_snapshot()
            .map(|s| s.as_ref().clone())
            .unwrap_or_default();
        for (partition, writes) in &self.working {
            let target = out.entry(partition.clone()).or_default();
            for (key, value) in writes {
                match value {
                    Some(v) => {
                        target.insert(key.clone(), v.clone());
                    }
                    None => {
                        target.remove(key);
                    }
                }
            }
        }
        out.retain(|_, entries| !entries.is_empty());
        out
    }

    fn prune(&mut self) {
        if let Some(keep) = self.keep_recent {
            let floor = self.latest.saturating_sub(keep - 1);
            self.versions.retain(|v, _| *v >= floor);
        }
    }
}

impl Default for InMemoryVersionedStore {
    fn default() -> Self {
        Self::new()
    }
}

fn prefix_range<'a>(partition: &'a Partition, prefix: &'a [u8]) -> impl Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)> {
    partition
        .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(k, _)| k.starts_with(prefix))
}

impl VersionedStore for InMemoryVersionedStore {
    fn get(&self, partition: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(value) = self.working.get(partition).and_then(|w| w.get(key)) {
            return Ok(value.clone());
        }
        Ok(self
            .latest_snapshot()
            .and_then(|s| s.get(partition))
            .and_then(|p| p.get(key))
            .cloned())
    }

    fn set(&mut self, partition: &str, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.working
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, partition: &str, key: &[u8]) -> Result<(), StoreError> {
        self.working
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_vec(), None);
        Ok(())
    }

    fn iter_prefix(&self, partition: &str, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        let mut view: Partition = self
            .latest_snapshot()
            .and_then(|s| s.get(partition))
            .map(|p| {
                prefix_range(p, prefix)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if let Some(writes) = self.working.get(partition) {
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

    fn commit(&mut self) -> Result<CommitId, StoreError> {
        let snapshot = self.merged();
        let hash = state_root(&snapshot);
        self.latest += 1;
        self.versions
            .insert(self.latest, (Arc::new(snapshot), hash));
        self.working.clear();
        self.prune();
        debug!(version = self.latest, hash = %hex::encode(hash), "[Store] committed version");
        Ok(CommitId {
            version: self.latest,
            hash,
        })
    }

    fn load_at_version(&mut self, version: u64) -> Result<(), StoreError> {
        self.committed(version)?;
        self.versions.retain(|v, _| *v <= version);
        self.latest = version;
        self.working.clear();
        debug!(version, "[Store] loaded version");
        Ok(())
    }

    fn discard_working(&mut self) {
        self.working.clear();
    }

    fn get_at(
        &self,
        version: u64,
        partition: &str,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .committed(version)?
            .and_then(|s| s.get(partition))
            .and_then(|p| p.get(key))
            .cloned())
    }

    fn iter_prefix_at(
        &self,
        version: u64,
        partition: &str,
        prefix: &[u8],
    ) -> Result<KvPairs, StoreError> {
        Ok(self
            .committed(version)?
            .and_then(|s| s.get(partition))
            .map(|p| {
                prefix_range(p, prefix)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn latest_version(&self) -> u64 {
        self.latest
    }

    fn last_commit(&self) -> CommitId {
        self.versions
            .get(&self.latest)
            .map(|(_, hash)| CommitId {
                version: self.latest,
                hash: *hash,
            })
            .unwrap_or(CommitId {
                version: 0,
                hash: empty_root(),
            })
    }

    fn working_hash(&self) -> Hash {
        state_root(&self.merged())
    }
}
