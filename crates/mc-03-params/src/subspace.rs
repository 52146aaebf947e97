use crate::{Authority, KeyTable, ParamSpec, ParamValue, ParamsError};
use mc_01_store::StoreKey;
use mc_02_module::Context;
use parking_lot::RwLock;
use shared_types::FatalError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// One module's view of the params partition.
///
/// Clones share the key-table binding.
#[derive(Clone)]
pub struct Subspace {
    name: String,
    store: StoreKey,
    transient: StoreKey,
    table: Arc<RwLock<Option<KeyTable>>>,
}

impl Subspace {
    pub(crate) fn new(name: &str, store: StoreKey, transient: StoreKey) -> Self {
        Self {
            name: name.to_string(),
            store,
            transient,
            table: Arc::new(RwLock::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_key_table(&self) -> bool {
        self.table.read().is_some()
    }

    /// Bind the key table. Fails if one is already bound.
    pub fn with_key_table(self, table: KeyTable) -> Result<Self, FatalError> {
        {
            let mut slot = self.table.write();
            if slot.is_some() {
                return Err(FatalError::KeyTableAlreadySet {
                    subspace: self.name.clone(),
                });
            }
            debug!(subspace = %self.name, keys = table.len(), "[Params] key table bound");
            *slot = Some(table);
        }
        Ok(self)
    }

    pub fn registered_keys(&self) -> Vec<&'static str> {
        self.table
            .read()
            .as_ref()
            .map(|t| t.keys().collect())
            .unwrap_or_default()
    }

    fn spec(&self, key: &str) -> Result<ParamSpec, ParamsError> {
        let table = self.table.read();
        let table = table
            .as_ref()
            .ok_or_else(|| ParamsError::NoKeyTable(self.name.clone()))?;
        table
            .spec(key)
            .copied()
            .ok_or_else(|| ParamsError::UnregisteredKey {
                subspace: self.name.clone(),
                key: key.to_string(),
            })
    }

    fn store_key(&self, key: &str) -> Vec<u8> {
        format!("{}/{}", self.name, key).into_bytes()
    }

    /// Read `key`; `NotFound` if registered but never set.
    pub fn get(&self, ctx: &mut Context<'_>, key: &str) -> Result<ParamValue, ParamsError> {
        self.get_if_exists(ctx, key)?
            .ok_or_else(|| ParamsError::NotFound {
                subspace: self.name.clone(),
                key: key.to_string(),
            })
    }

    pub fn get_if_exists(
        &self,
        ctx: &mut Context<'_>,
        key: &str,
    ) -> Result<Option<ParamValue>, ParamsError> {
        self.spec(key)?;
        Ok(ctx.kv(&self.store).get_typed(&self.store_key(key))?)
    }

    fn mismatch(&self, key: &str, expected: &str, got: &ParamValue) -> ParamsError {
        ParamsError::InvalidValue {
            subspace: self.name.clone(),
            key: key.to_string(),
            reason: format!("expected {expected}, stored {}", got.kind()),
        }
    }

    pub fn get_bool(&self, ctx: &mut Context<'_>, key: &str) -> Result<bool, ParamsError> {
        match self.get(ctx, key)? {
            ParamValue::Bool(v) => Ok(v),
            other => Err(self.mismatch(key, "bool", &other)),
        }
    }

    pub fn get_count(&self, ctx: &mut Context<'_>, key: &str) -> Result<u64, ParamsError> {
        match self.get(ctx, key)? {
            ParamValue::Count(v) => Ok(v),
            other => Err(self.mismatch(key, "count", &other)),
        }
    }

    pub fn get_quantity(&self, ctx: &mut Context<'_>, key: &str) -> Result<u128, ParamsError> {
        match self.get(ctx, key)? {
            ParamValue::Quantity(v) => Ok(v),
            other => Err(self.mismatch(key, "quantity", &other)),
        }
    }

    pub fn get_duration(&self, ctx: &mut Context<'_>, key: &str) -> Result<u64, ParamsError> {
        match self.get(ctx, key)? {
            ParamValue::Duration(v) => Ok(v),
            other => Err(self.mismatch(key, "duration", &other)),
        }
    }

    pub fn get_basis_points(&self, ctx: &mut Context<'_>, key: &str) -> Result<u16, ParamsError> {
        match self.get(ctx, key)? {
            ParamValue::BasisPoints(v) => Ok(v),
            other => Err(self.mismatch(key, "basis_points", &other)),
        }
    }

    pub fn get_text(&self, ctx: &mut Context<'_>, key: &str) -> Result<String, ParamsError> {
        match self.get(ctx, key)? {
            ParamValue::Text(v) => Ok(v),
            other => Err(self.mismatch(key, "text", &other)),
        }
    }

    fn check(&self, key: &str, value: &ParamValue) -> Result<(), ParamsError> {
        self.spec(key)?
            .validate(value)
            .map_err(|reason| ParamsError::InvalidValue {
                subspace: self.name.clone(),
                key: key.to_string(),
                reason,
            })
    }

    fn write(&self, ctx: &mut Context<'_>, key: &str, value: &ParamValue) -> Result<(), ParamsError> {
        let store_key = self.store_key(key);
        ctx.kv(&self.store).set_typed(&store_key, value)?;
        ctx.kv(&self.transient).set(&store_key, vec![1])?;
        Ok(())
    }

    /// Change one parameter on behalf of `authority`.
    ///
    /// Only the owning module and governance may write. The value is
    /// validated against the bound rule; on any failure the previous value
    /// stays in place.
    pub fn set(
        &self,
        ctx: &mut Context<'_>,
        authority: &Authority,
        key: &str,
        value: ParamValue,
    ) -> Result<(), ParamsError> {
        let allowed = match authority {
            Authority::Governance => true,
            Authority::Module(owner) => owner == &self.name,
        };
        if !allowed {
            return Err(ParamsError::Unauthorized {
                subspace: self.name.clone(),
                authority: authority.to_string(),
            });
        }
        self.check(key, &value)?;
        self.write(ctx, key, &value)?;
        debug!(subspace = %self.name, key, by = %authority, "[Params] parameter set");
        Ok(())
    }

    /// Write a whole parameter set, as module genesis does. Every value is
    /// validated before anything is written.
    pub fn set_param_set(
        &self,
        ctx: &mut Context<'_>,
        pairs: &[(&str, ParamValue)],
    ) -> Result<(), ParamsError> {
        for (key, value) in pairs {
            self.check(key, value)?;
        }
        for (key, value) in pairs {
            self.write(ctx, key, value)?;
        }
        Ok(())
    }

    /// Every set parameter of this subspace, by key.
    pub fn get_param_set(
        &self,
        ctx: &mut Context<'_>,
    ) -> Result<BTreeMap<String, ParamValue>, ParamsError> {
        let mut out = BTreeMap::new();
        for key in self.registered_keys() {
            if let Some(value) = self.get_if_exists(ctx, key)? {
                out.insert(key.to_string(), value);
            }
        }
        Ok(out)
    }

    /// Whether `key` changed in the current block.
    pub fn modified(&self, ctx: &mut Context<'_>, key: &str) -> Result<bool, ParamsError> {
        self.spec(key)?;
        Ok(ctx.kv(&self.transient).has(&self.store_key(key))?)
    }
}
