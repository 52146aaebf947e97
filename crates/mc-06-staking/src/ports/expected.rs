use mc_02_module::{Context, ModuleError};
use shared_types::{Address, Coins};

/// What staking needs from the account keeper.
pub trait AccountKeeper: Send + Sync {
    /// Address of module `name`, creating its account on first use. Fails
    /// fatally when the module has no permission entry.
    fn module_address(&self, ctx: &mut Context<'_>, name: &str) -> Result<Address, ModuleError>;
}

/// What staking needs from the bank keeper.
pub trait BankKeeper: Send + Sync {
    fn balance(&self, ctx: &mut Context<'_>, address: &Address, denom: &str) -> Result<u128, ModuleError>;

    fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), ModuleError>;

    fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        delegator: &Address,
        coins: &Coins,
    ) -> Result<(), ModuleError>;

    fn send_coins_from_module_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        coins: &Coins,
    ) -> Result<(), ModuleError>;
}
