//! # State Root
//!
//! ```text
//! partition_hash = keccak256( for (k, v) in sorted(entries): len(k) ‖ k ‖ len(v) ‖ v )
//! state_root     = keccak256( for (name, h) in sorted(non-empty partitions): len(name) ‖ name ‖ h )
//! ```
//!
//! Lengths are big-endian `u64`. Empty partitions do not contribute, so
//! mounting an unused partition does not change the root.

use sha3::{Digest, Keccak256};
use shared_types::Hash;
use std::collections::BTreeMap;

/// Root of a store with no entries at all.
pub fn empty_root() -> Hash {
    Keccak256::digest(b"").into()
}

pub fn partition_hash<'a>(entries: impl IntoIterator<Item = (&'a [u8], &'a [u8])>) -> Hash {
    let mut hasher = Keccak256::new();
    for (key, value) in entries {
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(key);
        hasher.update((value.len() as u64).to_be_bytes());
        hasher.update(value);
    }
    hasher.finalize().into()
}

/// Compute the root over `partitions`; a `BTreeMap` iterates in name order.
pub fn state_root(partitions: &BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>) -> Hash {
    let mut hasher = Keccak256::new();
    for (name, entries) in partitions.iter().filter(|(_, e)| !e.is_empty()) {
        let h = partition_hash(entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())));
        hasher.update((name.len() as u64).to_be_bytes());
        hasher.update(name.as_bytes());
        hasher.update(h);
    }
    hasher.finalize().into()
}
