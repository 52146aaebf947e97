use crate::{
    AccountKeeper, BankKeeper, BondStatus, Delegation, HistoricalInfo, LastValidatorPower,
    StakingError, StakingParams, UnbondingEntry, Validator,
};
use mc_01_store::{decode, StoreKey};
use mc_02_module::{Context, KeeperInfo, ModuleError};
use mc_03_params::Subspace;
use shared_types::{
    event_types as ev, module_names, Address, Coins, Event, FatalError, PublicKey,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub(crate) const LAST_POWER_PREFIX: u8 = 0x11;
pub(crate) const VALIDATOR_PREFIX: u8 = 0x21;
pub(crate) const VALIDATOR_BY_PUBKEY_PREFIX: u8 = 0x22;
pub(crate) const DELEGATION_PREFIX: u8 = 0x31;
pub(crate) const UNBONDING_QUEUE_PREFIX: u8 = 0x41;
pub(crate) const NEXT_UNBONDING_ID_KEY: &[u8] = &[0x42];
pub(crate) const HISTORICAL_PREFIX: u8 = 0x50;

fn prefixed(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let mut key = vec![prefix];
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

pub(crate) fn unbonding_key(completion_time: u64, id: u64) -> Vec<u8> {
    prefixed(
        UNBONDING_QUEUE_PREFIX,
        &[&completion_time.to_be_bytes(), &id.to_be_bytes()],
    )
}

pub(crate) fn historical_key(height: u64) -> Vec<u8> {
    prefixed(HISTORICAL_PREFIX, &[&height.to_be_bytes()])
}

/// Module account holding the tokens of validators with `status`.
pub fn pool_for(status: BondStatus) -> &'static str {
    match status {
        BondStatus::Bonded => module_names::BONDED_POOL,
        BondStatus::Unbonded => module_names::NOT_BONDED_POOL,
    }
}

/// Sole owner of the `staking` partition.
pub struct StakingKeeper {
    pub(crate) store: StoreKey,
    subspace: Subspace,
    pub(crate) accounts: Arc<dyn AccountKeeper>,
    pub(crate) bank: Arc<dyn BankKeeper>,
}

impl StakingKeeper {
    pub fn new(
        store: StoreKey,
        subspace: Subspace,
        accounts: Arc<dyn AccountKeeper>,
        bank: Arc<dyn BankKeeper>,
    ) -> Result<Self, FatalError> {
        let subspace = if subspace.has_key_table() {
            subspace
        } else {
            subspace.with_key_table(StakingParams::key_table())?
        };
        Ok(Self {
            store,
            subspace,
            accounts,
            bank,
        })
    }

    pub fn keeper_info() -> KeeperInfo {
        KeeperInfo::new(
            module_names::STAKING,
            &[module_names::AUTH, module_names::BANK, module_names::PARAMS],
        )
    }

    pub fn params(&self, ctx: &mut Context<'_>) -> Result<StakingParams, StakingError> {
        StakingParams::load(&self.subspace, ctx)
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &StakingParams) -> Result<(), StakingError> {
        Ok(self.subspace.set_param_set(ctx, &params.pairs())?)
    }

    /// Coins of `amount` in the bond denom; empty for zero.
    pub(crate) fn bond_coins(&self, ctx: &mut Context<'_>, amount: u128) -> Result<Coins, StakingError> {
        let denom = self.params(ctx)?.bond_denom;
        Ok(Coins::single(denom, amount)?)
    }

    // Validators

    pub fn get_validator(
        &self,
        ctx: &mut Context<'_>,
        operator: &Address,
    ) -> Result<Option<Validator>, StakingError> {
        let key = prefixed(VALIDATOR_PREFIX, &[operator.as_bytes()]);
        Ok(ctx.kv(&self.store).get_typed(&key)?)
    }

    pub fn validator_by_pubkey(
        &self,
        ctx: &mut Context<'_>,
        pub_key: &PublicKey,
    ) -> Result<Option<Address>, StakingError> {
        let key = prefixed(VALIDATOR_BY_PUBKEY_PREFIX, &[&pub_key.0]);
        Ok(ctx.kv(&self.store).get(&key)?.and_then(|b| Address::from_slice(&b)))
    }

    pub(crate) fn set_validator(&self, ctx: &mut Context<'_>, validator: &Validator) -> Result<(), StakingError> {
        let key = prefixed(VALIDATOR_PREFIX, &[validator.operator.as_bytes()]);
        let index = prefixed(VALIDATOR_BY_PUBKEY_PREFIX, &[&validator.consensus_pubkey.0]);
        let mut kv = ctx.kv(&self.store);
        kv.set_typed(&key, validator)?;
        kv.set(&index, validator.operator.as_bytes().to_vec())?;
        Ok(())
    }

    pub(crate) fn remove_validator(&self, ctx: &mut Context<'_>, validator: &Validator) -> Result<(), StakingError> {
        let mut kv = ctx.kv(&self.store);
        kv.delete(&prefixed(VALIDATOR_PREFIX, &[validator.operator.as_bytes()]))?;
        kv.delete(&prefixed(VALIDATOR_BY_PUBKEY_PREFIX, &[&validator.consensus_pubkey.0]))?;
        debug!(operator = %validator.operator, "[Staking] removed empty validator");
        Ok(())
    }

    /// All validators ordered by operator address.
    pub fn validators(&self, ctx: &mut Context<'_>) -> Result<Vec<Validator>, StakingError> {
        ctx.kv(&self.store)
            .iter_prefix(&[VALIDATOR_PREFIX])?
            .into_iter()
            .map(|(_, v)| decode(&v).map_err(StakingError::from))
            .collect()
    }

    /// Create a validator with no tokens. Fails if the operator or the
    /// consensus key is already registered.
    pub fn create_validator(
        &self,
        ctx: &mut Context<'_>,
        operator: Address,
        pub_key: PublicKey,
        moniker: String,
    ) -> Result<Validator, StakingError> {
        if self.get_validator(ctx, &operator)?.is_some() {
            return Err(StakingError::ValidatorExists(operator));
        }
        if self.validator_by_pubkey(ctx, &pub_key)?.is_some() {
            return Err(StakingError::PubKeyInUse(pub_key));
        }
        let validator = Validator {
            operator,
            consensus_pubkey: pub_key,
            moniker,
            status: BondStatus::Unbonded,
            tokens: 0,
        };
        self.set_validator(ctx, &validator)?;
        ctx.emit(
            Event::new(ev::CREATE_VALIDATOR)
                .attr(ev::ATTR_VALIDATOR, operator)
                .attr("pub_key", pub_key),
        );
        Ok(validator)
    }

    // Last reported powers

    pub fn last_validator_powers(
        &self,
        ctx: &mut Context<'_>,
    ) -> Result<BTreeMap<Address, LastValidatorPower>, StakingError> {
        let mut out = BTreeMap::new();
        for (key, value) in ctx.kv(&self.store).iter_prefix(&[LAST_POWER_PREFIX])? {
            let operator = Address::from_slice(&key[1..])
                .ok_or_else(|| ModuleError::decode("last power key", hex::encode(&key)))?;
            out.insert(operator, decode(&value)?);
        }
        Ok(out)
    }

    pub(crate) fn set_last_power(
        &self,
        ctx: &mut Context<'_>,
        operator: &Address,
        power: &LastValidatorPower,
    ) -> Result<(), StakingError> {
        let key = prefixed(LAST_POWER_PREFIX, &[operator.as_bytes()]);
        Ok(ctx.kv(&self.store).set_typed(&key, power)?)
    }

    pub(crate) fn delete_last_power(&self, ctx: &mut Context<'_>, operator: &Address) -> Result<(), StakingError> {
        let key = prefixed(LAST_POWER_PREFIX, &[operator.as_bytes()]);
        Ok(ctx.kv(&self.store).delete(&key)?)
    }

    // Delegations

    pub fn get_delegation(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Option<Delegation>, StakingError> {
        let key = prefixed(DELEGATION_PREFIX, &[delegator.as_bytes(), validator.as_bytes()]);
        Ok(ctx.kv(&self.store).get_typed(&key)?)
    }

    pub(crate) fn set_delegation(&self, ctx: &mut Context<'_>, delegation: &Delegation) -> Result<(), StakingError> {
        let key = prefixed(
            DELEGATION_PREFIX,
            &[delegation.delegator.as_bytes(), delegation.validator.as_bytes()],
        );
        let mut kv = ctx.kv(&self.store);
        if delegation.shares == 0 {
            kv.delete(&key)?;
        } else {
            kv.set_typed(&key, delegation)?;
        }
        Ok(())
    }

    /// Delegations of one delegator, or of everyone when `None`.
    pub fn delegations(
        &self,
        ctx: &mut Context<'_>,
        delegator: Option<&Address>,
    ) -> Result<Vec<Delegation>, StakingError> {
        let prefix = match delegator {
            Some(d) => prefixed(DELEGATION_PREFIX, &[d.as_bytes()]),
            None => vec![DELEGATION_PREFIX],
        };
        ctx.kv(&self.store)
            .iter_prefix(&prefix)?
            .into_iter()
            .map(|(_, v)| decode(&v).map_err(StakingError::from))
            .collect()
    }

    /// Move `amount` bond-denom tokens from `delegator` into `validator`.
    pub fn delegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
        amount: u128,
    ) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount("delegation amount must be positive".into()));
        }
        let mut target = self
            .get_validator(ctx, validator)?
            .ok_or(StakingError::ValidatorNotFound(*validator))?;
        let coins = self.bond_coins(ctx, amount)?;
        target.tokens = target
            .tokens
            .checked_add(amount)
            .ok_or_else(|| StakingError::InvalidAmount("validator tokens overflow".into()))?;
        let mut delegation = self
            .get_delegation(ctx, delegator, validator)?
            .unwrap_or(Delegation {
                delegator: *delegator,
                validator: *validator,
                shares: 0,
            });
        delegation.shares = delegation
            .shares
            .checked_add(amount)
            .ok_or_else(|| StakingError::InvalidAmount("delegation shares overflow".into()))?;

        ctx.branch(|ctx| -> Result<(), StakingError> {
            self.bank.delegate_coins_from_account_to_module(
                ctx,
                delegator,
                pool_for(target.status),
                &coins,
            )?;
            self.set_validator(ctx, &target)?;
            self.set_delegation(ctx, &delegation)?;
            ctx.emit(
                Event::new(ev::DELEGATE)
                    .attr(ev::ATTR_VALIDATOR, validator)
                    .attr(ev::ATTR_DELEGATOR, delegator)
                    .attr(ev::ATTR_AMOUNT, &coins),
            );
            Ok(())
        })?;
        debug!(%delegator, %validator, amount, "[Staking] delegated");
        Ok(())
    }

    /// Start unbonding `amount` tokens; returns the completion time.
    pub fn undelegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
        amount: u128,
    ) -> Result<u64, StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount("undelegation amount must be positive".into()));
        }
        let params = self.params(ctx)?;
        let mut delegation = self.get_delegation(ctx, delegator, validator)?.ok_or(
            StakingError::DelegationNotFound {
                delegator: *delegator,
                validator: *validator,
            },
        )?;
        if delegation.shares < amount {
            return Err(StakingError::InsufficientShares {
                available: delegation.shares,
                requested: amount,
            });
        }
        let pending = self
            .unbonding_entries(ctx)?
            .iter()
            .filter(|e| e.delegator == *delegator && e.validator == *validator)
            .count() as u64;
        if pending >= params.max_entries {
            return Err(StakingError::MaxUnbondingEntries {
                delegator: *delegator,
                validator: *validator,
            });
        }
        let mut target = self
            .get_validator(ctx, validator)?
            .ok_or(StakingError::ValidatorNotFound(*validator))?;
        let coins = Coins::single(params.bond_denom.clone(), amount)?;
        let completion_time = ctx.block_time().saturating_add(params.unbonding_time);
        delegation.shares -= amount;
        target.tokens = target.tokens.saturating_sub(amount);

        ctx.branch(|ctx| -> Result<(), StakingError> {
            if target.is_bonded() {
                self.bank.send_coins_from_module_to_module(
                    ctx,
                    module_names::BONDED_POOL,
                    module_names::NOT_BONDED_POOL,
                    &coins,
                )?;
            }
            self.set_delegation(ctx, &delegation)?;
            if target.tokens == 0 && !target.is_bonded() {
                self.remove_validator(ctx, &target)?;
            } else {
                self.set_validator(ctx, &target)?;
            }
            let id = self.next_unbonding_id(ctx)?;
            let entry = UnbondingEntry {
                id,
                delegator: *delegator,
                validator: *validator,
                creation_height: ctx.block_height(),
                completion_time,
                amount,
            };
            ctx.kv(&self.store)
                .set_typed(&unbonding_key(completion_time, id), &entry)?;
            ctx.emit(
                Event::new(ev::UNBOND)
                    .attr(ev::ATTR_VALIDATOR, validator)
                    .attr(ev::ATTR_DELEGATOR, delegator)
                    .attr(ev::ATTR_AMOUNT, &coins)
                    .attr(ev::ATTR_COMPLETION_TIME, completion_time),
            );
            Ok(())
        })?;
        debug!(%delegator, %validator, amount, completion_time, "[Staking] unbonding started");
        Ok(completion_time)
    }

    // Unbonding queue

    fn next_unbonding_id(&self, ctx: &mut Context<'_>) -> Result<u64, StakingError> {
        let mut kv = ctx.kv(&self.store);
        let id: u64 = kv.get_typed(NEXT_UNBONDING_ID_KEY)?.unwrap_or(1);
        kv.set_typed(NEXT_UNBONDING_ID_KEY, &(id + 1))?;
        Ok(id)
    }

    /// Pending unbonding entries in completion order.
    pub fn unbonding_entries(&self, ctx: &mut Context<'_>) -> Result<Vec<UnbondingEntry>, StakingError> {
        ctx.kv(&self.store)
            .iter_prefix(&[UNBONDING_QUEUE_PREFIX])?
            .into_iter()
            .map(|(_, v)| decode(&v).map_err(StakingError::from))
            .collect()
    }

    pub(crate) fn insert_unbonding_entry(
        &self,
        ctx: &mut Context<'_>,
        entry: &UnbondingEntry,
    ) -> Result<(), StakingError> {
        let mut kv = ctx.kv(&self.store);
        kv.set_typed(&unbonding_key(entry.completion_time, entry.id), entry)?;
        let next: u64 = kv.get_typed(NEXT_UNBONDING_ID_KEY)?.unwrap_or(1);
        if entry.id >= next {
            kv.set_typed(NEXT_UNBONDING_ID_KEY, &(entry.id + 1))?;
        }
        Ok(())
    }

    // Historical info

    pub fn historical_info(
        &self,
        ctx: &mut Context<'_>,
        height: u64,
    ) -> Result<Option<HistoricalInfo>, StakingError> {
        Ok(ctx.kv(&self.store).get_typed(&historical_key(height))?)
    }
}
