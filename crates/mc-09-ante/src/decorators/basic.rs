use crate::{AccountKeeper, AnteDecorator, AnteError, AnteTx};
use mc_02_module::Context;
use std::sync::Arc;

/// Stateless structure checks.
pub struct ValidateBasicDecorator;

impl AnteDecorator for ValidateBasicDecorator {
    fn name(&self) -> &'static str {
        "ValidateBasic"
    }

    fn ante(&self, _ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let inner = &tx.tx;
        if inner.signatures.is_empty() {
            return Err(AnteError::NoSignatures);
        }
        let expected = tx.signers.len();
        for got in [inner.signatures.len(), inner.auth_info.signer_infos.len()] {
            if got != expected {
                return Err(AnteError::SignerCountMismatch { expected, got });
            }
        }
        if tx.gas_limit() == 0 {
            return Err(AnteError::ZeroGas);
        }
        if let Some(payer) = inner.auth_info.fee.payer {
            if !tx.signers.contains(&payer) {
                return Err(AnteError::PayerNotSigner(payer));
            }
        }
        Ok(())
    }
}

/// Rejects transactions past their timeout height.
pub struct TxTimeoutHeightDecorator;

impl AnteDecorator for TxTimeoutHeightDecorator {
    fn name(&self) -> &'static str {
        "TxTimeoutHeight"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let timeout = tx.tx.body.timeout_height;
        let height = ctx.block_height();
        if timeout > 0 && height > timeout {
            return Err(AnteError::TimedOut { timeout, height });
        }
        Ok(())
    }
}

pub struct ValidateMemoDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl ValidateMemoDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for ValidateMemoDecorator {
    fn name(&self) -> &'static str {
        "ValidateMemo"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let max = self.accounts.params(ctx)?.max_memo_characters;
        let got = tx.tx.body.memo.chars().count() as u64;
        if got > max {
            return Err(AnteError::MemoTooLarge { max, got });
        }
        Ok(())
    }
}

/// Charges gas proportional to the encoded size.
pub struct ConsumeTxSizeDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl ConsumeTxSizeDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for ConsumeTxSizeDecorator {
    fn name(&self) -> &'static str {
        "ConsumeTxSize"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let per_byte = self.accounts.params(ctx)?.tx_size_cost_per_byte;
        ctx.consume_gas(per_byte.saturating_mul(tx.size), "txSize")?;
        Ok(())
    }
}
