use crate::{AccountKeeper, BankError, BankParams, ModuleAccountInfo};
use mc_01_store::{decode, StoreKey};
use mc_02_module::{Context, KeeperInfo, ModuleError};
use mc_03_params::Subspace;
use shared_types::{
    event_types as ev, module_names, Address, Coin, Coins, Event, FatalError, Permission,
    ADDRESS_LEN,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

const SUPPLY_PREFIX: u8 = 0x00;
const BALANCE_PREFIX: u8 = 0x02;

fn balances_prefix(address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + ADDRESS_LEN);
    key.push(BALANCE_PREFIX);
    key.extend_from_slice(address.as_bytes());
    key
}

fn balance_key(address: &Address, denom: &str) -> Vec<u8> {
    let mut key = balances_prefix(address);
    key.extend_from_slice(denom.as_bytes());
    key
}

fn supply_key(denom: &str) -> Vec<u8> {
    let mut key = vec![SUPPLY_PREFIX];
    key.extend_from_slice(denom.as_bytes());
    key
}

/// Sole owner of the `bank` partition.
pub struct BankKeeper {
    store: StoreKey,
    subspace: Subspace,
    accounts: Arc<dyn AccountKeeper>,
    blocked: BTreeSet<Address>,
}

impl BankKeeper {
    /// `blocked` lists addresses that may never receive funds through
    /// user-facing sends, normally every module account.
    pub fn new(
        store: StoreKey,
        subspace: Subspace,
        accounts: Arc<dyn AccountKeeper>,
        blocked: BTreeSet<Address>,
    ) -> Result<Self, FatalError> {
        let subspace = if subspace.has_key_table() {
            subspace
        } else {
            subspace.with_key_table(BankParams::key_table())?
        };
        Ok(Self {
            store,
            subspace,
            accounts,
            blocked,
        })
    }

    pub fn keeper_info() -> KeeperInfo {
        KeeperInfo::new(module_names::BANK, &[module_names::AUTH, module_names::PARAMS])
    }

    pub fn params(&self, ctx: &mut Context<'_>) -> Result<BankParams, BankError> {
        BankParams::load(&self.subspace, ctx)
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &BankParams) -> Result<(), BankError> {
        Ok(self.subspace.set_param_set(ctx, &params.pairs())?)
    }

    pub fn is_blocked(&self, address: &Address) -> bool {
        self.blocked.contains(address)
    }

    pub fn get_balance(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        denom: &str,
    ) -> Result<u128, BankError> {
        Ok(ctx
            .kv(&self.store)
            .get_typed(&balance_key(address, denom))?
            .unwrap_or(0))
    }

    pub fn get_all_balances(&self, ctx: &mut Context<'_>, address: &Address) -> Result<Coins, BankError> {
        let prefix = balances_prefix(address);
        let mut coins = Vec::new();
        for (key, value) in ctx.kv(&self.store).iter_prefix(&prefix)? {
            let denom = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
            coins.push(Coin::new(denom, decode::<u128>(&value)?));
        }
        Ok(Coins::normalize(coins)?)
    }

    pub fn get_supply(&self, ctx: &mut Context<'_>, denom: &str) -> Result<u128, BankError> {
        Ok(ctx.kv(&self.store).get_typed(&supply_key(denom))?.unwrap_or(0))
    }

    pub fn get_total_supply(&self, ctx: &mut Context<'_>) -> Result<Coins, BankError> {
        let mut coins = Vec::new();
        for (key, value) in ctx.kv(&self.store).iter_prefix(&[SUPPLY_PREFIX])? {
            let denom = String::from_utf8_lossy(&key[1..]).into_owned();
            coins.push(Coin::new(denom, decode::<u128>(&value)?));
        }
        Ok(Coins::normalize(coins)?)
    }

    /// Every non-zero balance, grouped by address in address order.
    pub fn all_balances(&self, ctx: &mut Context<'_>) -> Result<BTreeMap<Address, Coins>, BankError> {
        let mut grouped: BTreeMap<Address, Vec<Coin>> = BTreeMap::new();
        for (key, value) in ctx.kv(&self.store).iter_prefix(&[BALANCE_PREFIX])? {
            let address = Address::from_slice(&key[1..1 + ADDRESS_LEN])
                .ok_or_else(|| BankError::InvalidCoins("corrupt balance key".into()))?;
            let denom = String::from_utf8_lossy(&key[1 + ADDRESS_LEN..]).into_owned();
            grouped
                .entry(address)
                .or_default()
                .push(Coin::new(denom, decode::<u128>(&value)?));
        }
        grouped
            .into_iter()
            .map(|(a, c)| -> Result<_, BankError> { Ok((a, Coins::normalize(c)?)) })
            .collect()
    }

    fn write_balance(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        denom: &str,
        amount: u128,
    ) -> Result<(), ModuleError> {
        let mut kv = ctx.kv(&self.store);
        if amount == 0 {
            kv.delete(&balance_key(address, denom))
        } else {
            kv.set_typed(&balance_key(address, denom), &amount)
        }
    }

    fn write_supply(&self, ctx: &mut Context<'_>, denom: &str, amount: u128) -> Result<(), ModuleError> {
        let mut kv = ctx.kv(&self.store);
        if amount == 0 {
            kv.delete(&supply_key(denom))
        } else {
            kv.set_typed(&supply_key(denom), &amount)
        }
    }

    /// Set a balance directly. Genesis only.
    pub(crate) fn set_balances(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        for coin in coins.iter() {
            self.write_balance(ctx, address, &coin.denom, coin.amount)?;
        }
        Ok(())
    }

    pub(crate) fn set_supply(&self, ctx: &mut Context<'_>, supply: &Coins) -> Result<(), BankError> {
        for coin in supply.iter() {
            self.write_supply(ctx, &coin.denom, coin.amount)?;
        }
        Ok(())
    }

    fn check_coins(coins: &Coins) -> Result<(), BankError> {
        if coins.is_empty() {
            return Err(BankError::InvalidCoins("empty amount".into()));
        }
        Ok(())
    }

    /// Fail unless `address` holds at least `coins`.
    fn require_funds(&self, ctx: &mut Context<'_>, address: &Address, coins: &Coins) -> Result<Coins, BankError> {
        let balance = self.get_all_balances(ctx, address)?;
        balance
            .checked_sub(coins)
            .map_err(|e| BankError::InsufficientFunds {
                address: *address,
                reason: e.to_string(),
            })
    }

    fn sub_unchecked(&self, ctx: &mut Context<'_>, address: &Address, coins: &Coins) -> Result<(), BankError> {
        for coin in coins.iter() {
            let have = self.get_balance(ctx, address, &coin.denom)?;
            let left = have
                .checked_sub(coin.amount)
                .ok_or_else(|| BankError::InsufficientFunds {
                    address: *address,
                    reason: format!("{have}{} < {coin}", coin.denom),
                })?;
            self.write_balance(ctx, address, &coin.denom, left)?;
        }
        Ok(())
    }

    fn add_unchecked(&self, ctx: &mut Context<'_>, address: &Address, coins: &Coins) -> Result<(), BankError> {
        for coin in coins.iter() {
            let have = self.get_balance(ctx, address, &coin.denom)?;
            let total = have
                .checked_add(coin.amount)
                .ok_or_else(|| BankError::InvalidCoins(format!("balance overflow for {}", coin.denom)))?;
            self.write_balance(ctx, address, &coin.denom, total)?;
        }
        Ok(())
    }

    /// Move `coins` between two accounts. Creates the recipient account if
    /// it does not exist yet.
    pub fn send_coins(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        Self::check_coins(coins)?;
        self.require_funds(ctx, from, coins)?;
        ctx.branch(|ctx| -> Result<(), BankError> {
            self.sub_unchecked(ctx, from, coins)?;
            self.add_unchecked(ctx, to, coins)?;
            self.accounts.ensure_account(ctx, to)?;
            ctx.emit(
                Event::new(ev::COIN_SPENT)
                    .attr(ev::ATTR_SPENDER, from)
                    .attr(ev::ATTR_AMOUNT, coins),
            );
            ctx.emit(
                Event::new(ev::COIN_RECEIVED)
                    .attr(ev::ATTR_RECEIVER, to)
                    .attr(ev::ATTR_AMOUNT, coins),
            );
            ctx.emit(
                Event::new(ev::TRANSFER)
                    .attr(ev::ATTR_RECIPIENT, to)
                    .attr(ev::ATTR_SENDER, from)
                    .attr(ev::ATTR_AMOUNT, coins),
            );
            Ok(())
        })?;
        debug!(from = %from, to = %to, amount = %coins, "[Bank] coins sent");
        Ok(())
    }

    fn module_with(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        permission: Option<Permission>,
    ) -> Result<ModuleAccountInfo, BankError> {
        let info = self.accounts.module_account(ctx, module)?;
        if let Some(p) = permission {
            if !info.permissions.contains(&p) {
                return Err(BankError::MissingPermission {
                    module: module.to_string(),
                    permission: p,
                });
            }
        }
        Ok(info)
    }

    pub fn send_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), BankError> {
        let info = self.module_with(ctx, module, None)?;
        self.send_coins(ctx, from, &info.address, coins)
    }

    pub fn send_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        to: &Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        if self.is_blocked(to) {
            return Err(BankError::Blocked(*to));
        }
        let info = self.module_with(ctx, module, None)?;
        self.send_coins(ctx, &info.address, to, coins)
    }

    pub fn send_coins_from_module_to_module(
        &self,
        ctx: &mut Context<'_>,
        from_module: &str,
        to_module: &str,
        coins: &Coins,
    ) -> Result<(), BankError> {
        let from = self.module_with(ctx, from_module, None)?;
        let to = self.module_with(ctx, to_module, None)?;
        self.send_coins(ctx, &from.address, &to.address, coins)
    }

    /// Bond `coins` from a delegator into a staking pool.
    pub fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        module: &str,
        coins: &Coins,
    ) -> Result<(), BankError> {
        let info = self.module_with(ctx, module, Some(Permission::Staking))?;
        self.send_coins(ctx, delegator, &info.address, coins)
    }

    /// Return `coins` from a staking pool to a delegator.
    pub fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        delegator: &Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        let info = self.module_with(ctx, module, Some(Permission::Staking))?;
        self.send_coins(ctx, &info.address, delegator, coins)
    }

    pub fn mint_coins(&self, ctx: &mut Context<'_>, module: &str, coins: &Coins) -> Result<(), BankError> {
        Self::check_coins(coins)?;
        let info = self.module_with(ctx, module, Some(Permission::Minter))?;
        ctx.branch(|ctx| -> Result<(), BankError> {
            self.add_unchecked(ctx, &info.address, coins)?;
            for coin in coins.iter() {
                let supply = self.get_supply(ctx, &coin.denom)?;
                let total = supply
                    .checked_add(coin.amount)
                    .ok_or_else(|| BankError::InvalidCoins(format!("supply overflow for {}", coin.denom)))?;
                self.write_supply(ctx, &coin.denom, total)?;
            }
            ctx.emit(
                Event::new(ev::MINT)
                    .attr(ev::ATTR_MINTER, info.address)
                    .attr(ev::ATTR_AMOUNT, coins),
            );
            Ok(())
        })
    }

    pub fn burn_coins(&self, ctx: &mut Context<'_>, module: &str, coins: &Coins) -> Result<(), BankError> {
        Self::check_coins(coins)?;
        let info = self.module_with(ctx, module, Some(Permission::Burner))?;
        self.require_funds(ctx, &info.address, coins)?;
        ctx.branch(|ctx| -> Result<(), BankError> {
            self.sub_unchecked(ctx, &info.address, coins)?;
            for coin in coins.iter() {
                let supply = self.get_supply(ctx, &coin.denom)?;
                self.write_supply(ctx, &coin.denom, supply.saturating_sub(coin.amount))?;
            }
            ctx.emit(
                Event::new(ev::BURN)
                    .attr(ev::ATTR_BURNER, info.address)
                    .attr(ev::ATTR_AMOUNT, coins),
            );
            Ok(())
        })
    }
}
