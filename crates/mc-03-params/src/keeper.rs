use crate::Subspace;
use mc_01_store::StoreKey;
use mc_02_module::KeeperInfo;
use parking_lot::RwLock;
use shared_types::{module_names, FatalError};
use std::collections::BTreeMap;
use tracing::info;

/// Registry of parameter subspaces.
///
/// Owns the persistent params partition and the transient partition that
/// records which keys changed in the current block.
pub struct ParamsKeeper {
    store: StoreKey,
    transient: StoreKey,
    subspaces: RwLock<BTreeMap<String, Subspace>>,
}

impl ParamsKeeper {
    pub fn new(store: StoreKey, transient: StoreKey) -> Self {
        Self {
            store,
            transient,
            subspaces: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn keeper_info() -> KeeperInfo {
        KeeperInfo::new(module_names::PARAMS, &[])
    }

    /// Create the subspace for `name`. Each name may be created once.
    pub fn subspace(&self, name: &str) -> Result<Subspace, FatalError> {
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if !valid {
            return Err(FatalError::Config(format!("invalid subspace name {name:?}")));
        }
        let mut subspaces = self.subspaces.write();
        if subspaces.contains_key(name) {
            return Err(FatalError::DuplicateSubspace {
                subspace: name.to_string(),
            });
        }
        let subspace = Subspace::new(name, self.store.clone(), self.transient.clone());
        subspaces.insert(name.to_string(), subspace.clone());
        info!(subspace = name, "[Params] subspace registered");
        Ok(subspace)
    }

    pub fn get_subspace(&self, name: &str) -> Option<Subspace> {
        self.subspaces.read().get(name).cloned()
    }

    pub fn subspace_names(&self) -> Vec<String> {
        self.subspaces.read().keys().cloned().collect()
    }
}
