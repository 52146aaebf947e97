use crate::{AccountKeeper, AnteDecorator, AnteError, AnteTx, SignerAccount};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use mc_02_module::{Context, ExecMode};
use shared_types::{event_types, Address, Event, PublicKey};
use std::sync::Arc;
use tracing::debug;

fn load_signer(
    accounts: &dyn AccountKeeper,
    ctx: &mut Context<'_>,
    address: &Address,
) -> Result<SignerAccount, AnteError> {
    let account = accounts
        .signer_account(ctx, address)?
        .ok_or(AnteError::UnknownAccount(*address))?;
    if account.is_module {
        return Err(AnteError::ModuleAccountSigner(*address));
    }
    Ok(account)
}

/// Attaches public keys carried by the transaction to their accounts.
pub struct SetPubKeyDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl SetPubKeyDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for SetPubKeyDecorator {
    fn name(&self) -> &'static str {
        "SetPubKey"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        for (signer, info) in tx.signers.iter().zip(&tx.tx.auth_info.signer_infos) {
            let account = load_signer(self.accounts.as_ref(), ctx, signer)?;
            let Some(pub_key) = info.public_key else {
                continue;
            };
            if Address::from_pubkey(&pub_key) != *signer {
                return Err(AnteError::PubKeyMismatch(*signer));
            }
            match account.pub_key {
                Some(existing) if existing != pub_key => {
                    return Err(AnteError::PubKeyMismatch(*signer));
                }
                Some(_) => {}
                None => self.accounts.set_pub_key(ctx, signer, pub_key)?,
            }
            ctx.emit(
                Event::new(event_types::TX)
                    .attr(event_types::ATTR_ACC_SEQ, format!("{}/{}", signer, info.sequence)),
            );
        }
        Ok(())
    }
}

pub struct ValidateSigCountDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl ValidateSigCountDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for ValidateSigCountDecorator {
    fn name(&self) -> &'static str {
        "ValidateSigCount"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let max = self.accounts.params(ctx)?.tx_sig_limit;
        let got = tx.tx.auth_info.signer_infos.len() as u64;
        if got > max {
            return Err(AnteError::TooManySignatures { max, got });
        }
        Ok(())
    }
}

/// Charges the per-signature verification cost.
pub struct SigGasConsumeDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl SigGasConsumeDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for SigGasConsumeDecorator {
    fn name(&self) -> &'static str {
        "SigGasConsume"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let cost = self.accounts.params(ctx)?.sig_verify_cost_ed25519;
        for _ in &tx.tx.signatures {
            ctx.consume_gas(cost, "ante verify: ed25519")?;
        }
        Ok(())
    }
}

/// Checks sequences and verifies each signature over its sign document.
///
/// Simulation checks sequences but skips the signatures themselves. At
/// genesis every signer signs with account number 0, since account numbers
/// are only assigned while genesis runs.
pub struct SigVerificationDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl SigVerificationDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }

    fn verify(pub_key: &PublicKey, msg: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&pub_key.0) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(msg, &signature).is_ok()
    }
}

impl AnteDecorator for SigVerificationDecorator {
    fn name(&self) -> &'static str {
        "SigVerification"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        let infos = &tx.tx.auth_info.signer_infos;
        for ((signer, info), signature) in tx.signers.iter().zip(infos).zip(&tx.tx.signatures) {
            let account = load_signer(self.accounts.as_ref(), ctx, signer)?;
            let pub_key = account.pub_key.ok_or(AnteError::MissingPubKey(*signer))?;
            if info.sequence != account.sequence {
                return Err(AnteError::WrongSequence {
                    address: *signer,
                    expected: account.sequence,
                    got: info.sequence,
                });
            }
            if ctx.mode() == ExecMode::Simulate {
                continue;
            }
            let account_number = if ctx.mode() == ExecMode::Genesis {
                0
            } else {
                account.account_number
            };
            let doc = tx.tx.sign_doc(ctx.chain_id(), account_number, account.sequence);
            if !Self::verify(&pub_key, &doc.bytes(), signature) {
                debug!(signer = %signer, "[Ante] signature rejected");
                return Err(AnteError::InvalidSignature(*signer));
            }
        }
        Ok(())
    }
}

pub struct IncrementSequenceDecorator {
    accounts: Arc<dyn AccountKeeper>,
}

impl IncrementSequenceDecorator {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for IncrementSequenceDecorator {
    fn name(&self) -> &'static str {
        "IncrementSequence"
    }

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError> {
        for signer in &tx.signers {
            self.accounts.increment_sequence(ctx, signer)?;
        }
        Ok(())
    }
}
