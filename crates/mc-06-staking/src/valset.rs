//! End-block validator-set computation, unbonding completion and
//! historical info tracking.

use crate::keeper::{historical_key, pool_for, HISTORICAL_PREFIX, UNBONDING_QUEUE_PREFIX};
use crate::{
    BondStatus, HistoricalInfo, HistoricalValidator, LastValidatorPower, StakingError,
    StakingKeeper, UnbondingEntry,
};
use mc_01_store::decode;
use mc_02_module::Context;
use shared_types::{event_types as ev, module_names, Event, ValidatorUpdate};
use std::cmp::Reverse;
use tracing::{debug, info};

impl StakingKeeper {
    /// Recompute the bonded set and return the delta against the powers
    /// last reported to consensus.
    ///
    /// Entering validators move their tokens to the bonded pool, leaving
    /// validators move theirs back and are reported with power 0. Updates
    /// are ordered by the new ranking, then removals by operator address.
    pub fn apply_validator_set_updates(
        &self,
        ctx: &mut Context<'_>,
    ) -> Result<Vec<ValidatorUpdate>, StakingError> {
        let max_validators = self.params(ctx)?.max_validators;
        let mut ranked: Vec<_> = self
            .validators(ctx)?
            .into_iter()
            .filter(|v| v.power() > 0)
            .collect();
        ranked.sort_by_key(|v| (Reverse(v.power()), v.operator));
        ranked.truncate(usize::try_from(max_validators).unwrap_or(usize::MAX));

        let mut last = self.last_validator_powers(ctx)?;
        let mut updates = Vec::new();

        for mut validator in ranked {
            let power = validator.power();
            if !validator.is_bonded() {
                let coins = self.bond_coins(ctx, validator.tokens)?;
                self.bank.send_coins_from_module_to_module(
                    ctx,
                    pool_for(BondStatus::Unbonded),
                    pool_for(BondStatus::Bonded),
                    &coins,
                )?;
                validator.status = BondStatus::Bonded;
                self.set_validator(ctx, &validator)?;
                debug!(operator = %validator.operator, power, "[Staking] validator bonded");
            }
            let previous = last.remove(&validator.operator);
            if previous.map(|p| p.power) != Some(power) {
                updates.push(ValidatorUpdate {
                    pub_key: validator.consensus_pubkey,
                    power,
                });
                self.set_last_power(
                    ctx,
                    &validator.operator,
                    &LastValidatorPower {
                        pub_key: validator.consensus_pubkey,
                        power,
                    },
                )?;
            }
        }

        // Whatever is left in `last` dropped out of the bonded set.
        for (operator, previous) in last {
            if let Some(mut validator) = self.get_validator(ctx, &operator)? {
                if validator.is_bonded() && validator.tokens > 0 {
                    let coins = self.bond_coins(ctx, validator.tokens)?;
                    self.bank.send_coins_from_module_to_module(
                        ctx,
                        pool_for(BondStatus::Bonded),
                        pool_for(BondStatus::Unbonded),
                        &coins,
                    )?;
                }
                validator.status = BondStatus::Unbonded;
                if validator.tokens == 0 {
                    self.remove_validator(ctx, &validator)?;
                } else {
                    self.set_validator(ctx, &validator)?;
                }
            }
            self.delete_last_power(ctx, &operator)?;
            updates.push(ValidatorUpdate {
                pub_key: previous.pub_key,
                power: 0,
            });
            debug!(%operator, "[Staking] validator left the bonded set");
        }

        if !updates.is_empty() {
            info!(
                height = ctx.block_height(),
                updates = updates.len(),
                "[Staking] validator set changed"
            );
        }
        Ok(updates)
    }

    /// Release every unbonding entry whose completion time has passed.
    pub fn complete_unbondings(&self, ctx: &mut Context<'_>) -> Result<Vec<UnbondingEntry>, StakingError> {
        let now = ctx.block_time();
        let queue = ctx.kv(&self.store).iter_prefix(&[UNBONDING_QUEUE_PREFIX])?;
        let mut completed = Vec::new();
        for (key, value) in queue {
            let entry: UnbondingEntry = decode(&value)?;
            if entry.completion_time > now {
                break;
            }
            let coins = self.bond_coins(ctx, entry.amount)?;
            self.bank.undelegate_coins_from_module_to_account(
                ctx,
                module_names::NOT_BONDED_POOL,
                &entry.delegator,
                &coins,
            )?;
            ctx.kv(&self.store).delete(&key)?;
            ctx.emit(
                Event::new(ev::COMPLETE_UNBONDING)
                    .attr(ev::ATTR_VALIDATOR, entry.validator)
                    .attr(ev::ATTR_DELEGATOR, entry.delegator)
                    .attr(ev::ATTR_AMOUNT, &coins),
            );
            completed.push(entry);
        }
        Ok(completed)
    }

    /// Record this block's header and bonded set, pruning entries older
    /// than `historical_entries` blocks.
    pub fn track_historical_info(&self, ctx: &mut Context<'_>) -> Result<(), StakingError> {
        let entries = self.params(ctx)?.historical_entries;
        let height = ctx.block_height();
        let cutoff = height.saturating_sub(entries);
        let stored_heights = ctx.kv(&self.store).iter_prefix(&[HISTORICAL_PREFIX])?;
        for (key, _) in stored_heights {
            let stored = key
                .get(1..9)
                .and_then(|b| <[u8; 8]>::try_from(b).ok())
                .map(u64::from_be_bytes)
                .unwrap_or(0);
            if stored > cutoff {
                break;
            }
            ctx.kv(&self.store).delete(&key)?;
        }
        if entries == 0 {
            return Ok(());
        }
        let validators = self
            .last_validator_powers(ctx)?
            .into_iter()
            .map(|(operator, last)| HistoricalValidator {
                operator,
                power: last.power,
            })
            .collect();
        let info = HistoricalInfo {
            height,
            time: ctx.block_time(),
            validators,
        };
        Ok(ctx.kv(&self.store).set_typed(&historical_key(height), &info)?)
    }
}
