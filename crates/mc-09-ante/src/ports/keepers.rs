use mc_02_module::{Context, ModuleError};
use mc_04_auth::AuthParams;
use shared_types::{Address, Coins, PublicKey};

/// A signing account as the admission pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerAccount {
    pub address: Address,
    pub account_number: u64,
    pub sequence: u64,
    pub pub_key: Option<PublicKey>,
    pub is_module: bool,
}

/// What the pipeline needs from the account keeper.
pub trait AccountKeeper: Send + Sync {
    fn params(&self, ctx: &mut Context<'_>) -> Result<AuthParams, ModuleError>;

    fn signer_account(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
    ) -> Result<Option<SignerAccount>, ModuleError>;

    fn set_pub_key(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        pub_key: PublicKey,
    ) -> Result<(), ModuleError>;

    fn increment_sequence(&self, ctx: &mut Context<'_>, address: &Address) -> Result<u64, ModuleError>;
}

/// What the pipeline needs from the bank keeper.
pub trait BankKeeper: Send + Sync {
    fn send_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), ModuleError>;
}
