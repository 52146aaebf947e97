use crate::{AnteDecorator, AnteError, AnteTx, BankKeeper, FeePolicy};
use mc_02_module::{Context, ExecMode};
use shared_types::{event_types, module_names, Event, TxError};
use std::sync::Arc;
use tracing::debug;

/// Enforces the node's minimum gas prices on mempool admission.
///
/// The fee must meet the required amount in at least one priced denom.
pub struct MempoolFeeDecorator {
    policy: FeePolicy,
}

impl MempoolFeeDecorator {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }
}

impl AnteDecorator for MempoolFeeDecorator {
    fn name(&self) -> &'static str {
        "MempoolFee"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        if ctx.mode() != ExecMode::Check || self.policy.min_gas_prices.is_zero() {
            return Ok(());
        }
        let gas = tx.gas_limit();
        if self.policy.allows_bypass(tx.msg_types(), gas) {
            debug!(gas, "[Ante] minimum fee bypassed");
            return Ok(());
        }
        let required = self
            .policy
            .min_gas_prices
            .required_fees(gas)
            .map_err(|e| TxError::invalid_coins(e.to_string()))?;
        if required.is_empty() {
            return Ok(());
        }
        let fee = &tx.tx.auth_info.fee.amount;
        let covered = required
            .iter()
            .any(|coin| fee.amount_of(&coin.denom) >= coin.amount);
        if !covered {
            return Err(AnteError::InsufficientFee {
                required,
                got: fee.clone(),
            });
        }
        Ok(())
    }
}

/// Moves the fee from the payer to the fee collector.
pub struct DeductFeeDecorator {
    bank: Arc<dyn BankKeeper>,
}

impl DeductFeeDecorator {
    pub fn new(bank: Arc<dyn BankKeeper>) -> Self {
        Self { bank }
    }
}

impl AnteDecorator for DeductFeeDecorator {
    fn name(&self) -> &'static str {
        "DeductFee"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let fee = &tx.tx.auth_info.fee.amount;
        let payer = tx.fee_payer().ok_or(AnteError::NoSignatures)?;
        if !fee.is_empty() {
            self.bank
                .send_coins_from_account_to_module(ctx, &payer, module_names::FEE_COLLECTOR, fee)?;
        }
        ctx.emit(
            Event::new(event_types::TX)
                .attr(event_types::ATTR_FEE, fee)
                .attr(event_types::ATTR_FEE_PAYER, payer),
        );
        Ok(())
    }
}
