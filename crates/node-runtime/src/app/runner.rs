//! Transaction execution shared by deliver, check, simulate and genesis.

use crate::wiring::MsgRouter;
use mc_01_store::StoreError;
use mc_02_module::{Context, ModuleError, Tx};
use mc_09_ante::{AnteError, AnteHandler};
use shared_types::{FatalError, TxError};
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of one transaction that did not halt the application.
pub type TxOutcome = Result<Vec<u8>, TxError>;

pub struct TxRunner {
    ante: AnteHandler,
    router: Arc<MsgRouter>,
}

impl TxRunner {
    pub fn new(ante: AnteHandler, router: Arc<MsgRouter>) -> Self {
        Self { ante, router }
    }

    pub fn router(&self) -> &MsgRouter {
        &self.router
    }

    pub fn ante(&self) -> &AnteHandler {
        &self.ante
    }

    /// Admission only, as used for mempool checks.
    pub fn admit(
        &self,
        ctx: &mut Context<'_>,
        tx: &Tx,
        size: u64,
    ) -> Result<Result<(), TxError>, FatalError> {
        match self.ante.run(ctx, tx, size) {
            Ok(_) => Ok(Ok(())),
            Err(AnteError::Module(err)) => classify(err).map(Err),
            Err(err) => Ok(Err(err.into())),
        }
    }

    /// Admission, then every message on one branch of `ctx`.
    ///
    /// Admission writes (fee, sequence, public key) survive a message
    /// failure; message writes survive only if every message succeeds. The
    /// outer `Err` is reserved for failures that must halt the application.
    pub fn execute(&self, ctx: &mut Context<'_>, tx: &Tx, size: u64) -> Result<TxOutcome, FatalError> {
        if let Err(rejected) = self.admit(ctx, tx, size)? {
            return Ok(Err(rejected));
        }

        let result = ctx.branch(|ctx| -> Result<Vec<Vec<u8>>, ModuleError> {
            let mut data = Vec::with_capacity(tx.body.messages.len());
            for (index, msg) in tx.body.messages.iter().enumerate() {
                let out = self.router.handle(ctx, msg).map_err(|err| {
                    debug!(index, type_url = %msg.type_url, error = %err, "[Runner] message failed");
                    err
                })?;
                data.push(out);
            }
            Ok(data)
        });

        match result {
            Ok(data) => Ok(mc_01_store::encode(&data).map_err(TxError::from)),
            Err(err) => classify(err).map(Err),
        }
    }
}

/// Split a module error into a rejection or a halt.
///
/// Corrupt stored state and unmounted partitions cannot be blamed on the
/// sender, so they halt the application like an explicit fatal error.
pub fn classify(err: ModuleError) -> Result<TxError, FatalError> {
    match err {
        ModuleError::Fatal(fatal) => Err(fatal),
        ModuleError::Store(store @ (StoreError::NotMounted { .. } | StoreError::Codec(_))) => {
            error!(error = %store, "[Runner] store failure during execution");
            Err(store.into())
        }
        ModuleError::Decode { what, reason } => {
            error!(%what, %reason, "[Runner] corrupt state during execution");
            Err(FatalError::Store(format!("cannot decode {what}: {reason}")))
        }
        other => Ok(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::codes;

    #[test]
    fn test_classify() {
        assert!(classify(ModuleError::Fatal(FatalError::CapabilitySealed)).is_err());
        assert!(classify(ModuleError::decode("account", "truncated")).is_err());
        assert!(classify(StoreError::Codec("bad".into()).into()).is_err());
        let rejected = classify(ModuleError::OutOfGas {
            descriptor: "WriteFlat".into(),
            limit: 1,
            used: 2,
        })
        .unwrap();
        assert!(rejected.is(codes::ROOT_CODESPACE, codes::OUT_OF_GAS));
        let read_only = classify(StoreError::ReadOnly { name: "bank".into() }.into()).unwrap();
        assert_eq!(read_only.codespace, mc_01_store::STORE_CODESPACE);
    }
}
