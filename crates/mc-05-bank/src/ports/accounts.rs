use mc_02_module::{Context, ModuleError};
use shared_types::{Address, Permission};
use std::collections::BTreeSet;

/// A module account as the bank sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAccountInfo {
    pub name: String,
    pub address: Address,
    pub permissions: BTreeSet<Permission>,
}

/// What the bank needs from the account keeper.
pub trait AccountKeeper: Send + Sync {
    /// Create a base account for `address` if none exists.
    fn ensure_account(&self, ctx: &mut Context<'_>, address: &Address) -> Result<(), ModuleError>;

    /// Fetch, creating on first use, the account of module `name`.
    fn module_account(
        &self,
        ctx: &mut Context<'_>,
        name: &str,
    ) -> Result<ModuleAccountInfo, ModuleError>;
}
