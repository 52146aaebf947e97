use mc_02_module::{Context, ModuleError};
use mc_05_bank::BankKeeper;
use shared_types::{Address, Coins};
use std::sync::Arc;

/// Exposes the bank keeper through the ports of staking and the admission
/// pipeline.
#[derive(Clone)]
pub struct BankAdapter {
    keeper: Arc<BankKeeper>,
}

impl BankAdapter {
    pub fn new(keeper: Arc<BankKeeper>) -> Self {
        Self { keeper }
    }
}

impl mc_06_staking::BankKeeper for BankAdapter {
    fn balance(&self, ctx: &mut Context<'_>, address: &Address, denom: &str) -> Result<u128, ModuleError> {
        Ok(self.keeper.get_balance(ctx, address, denom)?)
    }

    fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), ModuleError> {
        Ok(self
            .keeper
            .delegate_coins_from_account_to_module(ctx, delegator, module, coins)?)
    }

    fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        delegator: &Address,
        coins: &Coins,
    ) -> Result<(), ModuleError> {
        Ok(self
            .keeper
            .undelegate_coins_from_module_to_account(ctx, module, delegator, coins)?)
    }

    fn send_coins_from_module_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        coins: &Coins,
    ) -> Result<(), ModuleError> {
        Ok(self.keeper.send_coins_from_module_to_module(ctx, from, to, coins)?)
    }
}

impl mc_09_ante::BankKeeper for BankAdapter {
    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), ModuleError> {
        Ok(self
            .keeper
            .send_coins_from_account_to_module(ctx, from, module, coins)?)
    }
}
