use crate::{GasMeter, KvGasConfig, ModuleError};
use mc_01_store::{decode, encode, KvPairs, StoreBackend, StoreKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Gas-metered access to a single partition.
///
/// Obtained through [`crate::Context::kv`]; the handle is bound to one
/// [`StoreKey`] so a keeper can only reach partitions it holds keys for.
pub struct KvStore<'c> {
    store: &'c mut dyn StoreBackend,
    gas: &'c mut GasMeter,
    key: &'c StoreKey,
    config: KvGasConfig,
}

impl<'c> KvStore<'c> {
    pub(crate) fn new(
        store: &'c mut dyn StoreBackend,
        gas: &'c mut GasMeter,
        key: &'c StoreKey,
        config: KvGasConfig,
    ) -> Self {
        Self {
            store,
            gas,
            key,
            config,
        }
    }

    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, ModuleError> {
        self.gas.consume(self.config.read_cost_flat, "ReadFlat")?;
        let value = self.store.get(self.key, key)?;
        let bytes = value.as_ref().map_or(0, Vec::len) as u64;
        self.gas
            .consume(self.config.read_cost_per_byte * bytes, "ReadPerByte")?;
        Ok(value)
    }

    pub fn has(&mut self, key: &[u8]) -> Result<bool, ModuleError> {
        self.gas.consume(self.config.has_cost, "Has")?;
        Ok(self.store.has(self.key, key)?)
    }

    pub fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), ModuleError> {
        self.gas.consume(self.config.write_cost_flat, "WriteFlat")?;
        let bytes = (key.len() + value.len()) as u64;
        self.gas
            .consume(self.config.write_cost_per_byte * bytes, "WritePerByte")?;
        Ok(self.store.set(self.key, key, value)?)
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<(), ModuleError> {
        self.gas.consume(self.config.delete_cost, "Delete")?;
        Ok(self.store.delete(self.key, key)?)
    }

    /// All entries under `prefix`, sorted by key.
    pub fn iter_prefix(&mut self, prefix: &[u8]) -> Result<KvPairs, ModuleError> {
        let entries = self.store.iter_prefix(self.key, prefix)?;
        for (k, v) in &entries {
            self.gas
                .consume(self.config.iter_next_cost_flat, "IterNextFlat")?;
            self.gas.consume(
                self.config.read_cost_per_byte * (k.len() + v.len()) as u64,
                "ValuePerByte",
            )?;
        }
        Ok(entries)
    }

    pub fn get_typed<T: DeserializeOwned>(&mut self, key: &[u8]) -> Result<Option<T>, ModuleError> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_typed<T: Serialize>(&mut self, key: &[u8], value: &T) -> Result<(), ModuleError> {
        let bytes = encode(value)?;
        self.set(key, bytes)
    }
}
