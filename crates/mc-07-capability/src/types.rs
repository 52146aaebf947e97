use serde::{Deserialize, Serialize};

/// Handle to one capability.
///
/// Only the capability keeper can mint one, so holding a `Capability` proves
/// it was created or passed on by the keeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability {
    index: u64,
}

impl Capability {
    pub(crate) fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub module: String,
    pub name: String,
}

impl Owner {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

/// Owners of one capability, sorted and unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityOwners {
    pub owners: Vec<Owner>,
}

impl CapabilityOwners {
    /// Insert `owner`; false if it was already present.
    pub fn add(&mut self, owner: Owner) -> bool {
        match self.owners.binary_search(&owner) {
            Ok(_) => false,
            Err(pos) => {
                self.owners.insert(pos, owner);
                true
            }
        }
    }

    pub fn remove(&mut self, owner: &Owner) -> bool {
        match self.owners.binary_search(owner) {
            Ok(pos) => {
                self.owners.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
