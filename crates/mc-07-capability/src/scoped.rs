use crate::keeper::CapabilityStores;
use crate::{Capability, CapabilityError, CapabilityOwners, Owner};
use mc_02_module::Context;
use std::sync::Arc;
use tracing::debug;

/// A module's view of the capability keeper. Every lookup is confined to
/// names the module itself bound.
#[derive(Debug, Clone)]
pub struct ScopedKeeper {
    module: String,
    stores: Arc<CapabilityStores>,
}

impl ScopedKeeper {
    pub(crate) fn new(module: String, stores: Arc<CapabilityStores>) -> Self {
        Self { module, stores }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Create a capability owned by this module under `name`.
    pub fn new_capability(&self, ctx: &mut Context<'_>, name: &str) -> Result<Capability, CapabilityError> {
        if name.is_empty() {
            return Err(CapabilityError::EmptyName);
        }
        if self.stores.index_of(ctx, &self.module, name)?.is_some() {
            return Err(CapabilityError::NameTaken {
                module: self.module.clone(),
                name: name.to_string(),
            });
        }
        let index = self.stores.latest_index(ctx)?;
        let mut owners = self.stores.owners(ctx, index)?.unwrap_or_default();
        owners.add(Owner::new(self.module.clone(), name));
        self.stores.set_owners(ctx, index, &owners)?;
        self.stores.set_index(ctx, index + 1)?;
        self.stores.map(ctx, &self.module, name, index)?;
        debug!(module = %self.module, name, index, "[Capability] created");
        Ok(Capability::new(index))
    }

    /// True if this module bound `cap` under `name`.
    pub fn authenticate_capability(
        &self,
        ctx: &mut Context<'_>,
        cap: &Capability,
        name: &str,
    ) -> Result<bool, CapabilityError> {
        if name.is_empty() {
            return Ok(false);
        }
        Ok(self.stores.name_of(ctx, &self.module, cap.index())?.as_deref() == Some(name))
    }

    /// Take co-ownership of a capability another module passed on.
    pub fn claim_capability(
        &self,
        ctx: &mut Context<'_>,
        cap: &Capability,
        name: &str,
    ) -> Result<(), CapabilityError> {
        if name.is_empty() {
            return Err(CapabilityError::EmptyName);
        }
        let index = cap.index();
        let mut owners = self
            .stores
            .owners(ctx, index)?
            .ok_or(CapabilityError::NoOwners(index))?;
        if self.stores.index_of(ctx, &self.module, name)?.is_some() {
            return Err(CapabilityError::NameTaken {
                module: self.module.clone(),
                name: name.to_string(),
            });
        }
        let already_owned = self.stores.name_of(ctx, &self.module, index)?.is_some();
        if already_owned || !owners.add(Owner::new(self.module.clone(), name)) {
            return Err(CapabilityError::AlreadyOwned {
                module: self.module.clone(),
                index,
            });
        }
        self.stores.set_owners(ctx, index, &owners)?;
        self.stores.map(ctx, &self.module, name, index)?;
        debug!(module = %self.module, name, index, "[Capability] claimed");
        Ok(())
    }

    /// Drop this module's ownership. The capability disappears with its
    /// last owner.
    pub fn release_capability(&self, ctx: &mut Context<'_>, cap: &Capability) -> Result<(), CapabilityError> {
        let index = cap.index();
        let not_owned = || CapabilityError::NotOwned {
            module: self.module.clone(),
            index,
        };
        let name = self
            .stores
            .name_of(ctx, &self.module, index)?
            .ok_or_else(not_owned)?;
        let mut owners = self.stores.owners(ctx, index)?.ok_or(CapabilityError::NoOwners(index))?;
        if !owners.remove(&Owner::new(self.module.clone(), name.clone())) {
            return Err(not_owned());
        }
        self.stores.unmap(ctx, &self.module, &name, index)?;
        self.stores.set_owners(ctx, index, &owners)?;
        debug!(module = %self.module, name = %name, index, "[Capability] released");
        Ok(())
    }

    pub fn get_capability(&self, ctx: &mut Context<'_>, name: &str) -> Result<Option<Capability>, CapabilityError> {
        Ok(self.stores.index_of(ctx, &self.module, name)?.map(Capability::new))
    }

    pub fn get_owners(&self, ctx: &mut Context<'_>, name: &str) -> Result<Option<CapabilityOwners>, CapabilityError> {
        match self.stores.index_of(ctx, &self.module, name)? {
            Some(index) => self.stores.owners(ctx, index),
            None => Ok(None),
        }
    }

    /// Modules owning the capability this module bound as `name`.
    pub fn lookup_modules(
        &self,
        ctx: &mut Context<'_>,
        name: &str,
    ) -> Result<Option<(Vec<String>, Capability)>, CapabilityError> {
        let Some(index) = self.stores.index_of(ctx, &self.module, name)? else {
            return Ok(None);
        };
        let owners = self.stores.owners(ctx, index)?.unwrap_or_default();
        let modules = owners.owners.into_iter().map(|o| o.module).collect();
        Ok(Some((modules, Capability::new(index))))
    }
}
