use mc_02_module::{Context, ModuleError};
use mc_04_auth::{AuthKeeper, AuthParams};
use mc_05_bank::ModuleAccountInfo;
use mc_09_ante::SignerAccount;
use shared_types::{Address, PublicKey};
use std::sync::Arc;

/// Exposes the account keeper through the ports of bank, staking and the
/// admission pipeline.
#[derive(Clone)]
pub struct AuthAdapter {
    keeper: Arc<AuthKeeper>,
}

impl AuthAdapter {
    pub fn new(keeper: Arc<AuthKeeper>) -> Self {
        Self { keeper }
    }
}

impl mc_05_bank::AccountKeeper for AuthAdapter {
    fn ensure_account(&self, ctx: &mut Context<'_>, address: &Address) -> Result<(), ModuleError> {
        self.keeper.ensure_account(ctx, address)?;
        Ok(())
    }

    fn module_account(
        &self,
        ctx: &mut Context<'_>,
        name: &str,
    ) -> Result<ModuleAccountInfo, ModuleError> {
        let account = self.keeper.get_module_account(ctx, name)?;
        Ok(ModuleAccountInfo {
            name: account.name,
            address: account.base.address,
            permissions: account.permissions.into_iter().collect(),
        })
    }
}

impl mc_06_staking::AccountKeeper for AuthAdapter {
    fn module_address(&self, ctx: &mut Context<'_>, name: &str) -> Result<Address, ModuleError> {
        Ok(self.keeper.get_module_account(ctx, name)?.base.address)
    }
}

impl mc_09_ante::AccountKeeper for AuthAdapter {
    fn params(&self, ctx: &mut Context<'_>) -> Result<AuthParams, ModuleError> {
        Ok(self.keeper.params(ctx)?)
    }

    fn signer_account(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
    ) -> Result<Option<SignerAccount>, ModuleError> {
        Ok(self.keeper.get_account(ctx, address)?.map(|account| SignerAccount {
            address: account.address(),
            account_number: account.account_number(),
            sequence: account.sequence(),
            pub_key: account.pub_key(),
            is_module: account.as_module().is_some(),
        }))
    }

    fn set_pub_key(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        pub_key: PublicKey,
    ) -> Result<(), ModuleError> {
        Ok(self.keeper.set_pub_key(ctx, address, pub_key)?)
    }

    fn increment_sequence(&self, ctx: &mut Context<'_>, address: &Address) -> Result<u64, ModuleError> {
        Ok(self.keeper.increment_sequence(ctx, address)?)
    }
}
