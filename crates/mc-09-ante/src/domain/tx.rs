use crate::AnteError;
use mc_02_module::{MsgValidator, Tx};
use shared_types::Address;

/// A decoded transaction with its required signers resolved.
#[derive(Debug, Clone)]
pub struct AnteTx {
    pub tx: Tx,
    /// Encoded length in bytes.
    pub size: u64,
    /// Required signers in first-appearance order, deduplicated.
    pub signers: Vec<Address>,
}

impl AnteTx {
    /// Resolve signers by running every message's stateless checks.
    pub fn new(tx: Tx, size: u64, validator: &dyn MsgValidator) -> Result<Self, AnteError> {
        if tx.body.messages.is_empty() {
            return Err(AnteError::NoMessages);
        }
        let mut signers: Vec<Address> = Vec::new();
        for msg in &tx.body.messages {
            for signer in validator.validate_msg(msg)? {
                if !signers.contains(&signer) {
                    signers.push(signer);
                }
            }
        }
        Ok(Self { tx, size, signers })
    }

    pub fn gas_limit(&self) -> u64 {
        self.tx.auth_info.fee.gas_limit
    }

    pub fn fee_payer(&self) -> Option<Address> {
        self.tx.fee_payer(&self.signers)
    }

    pub fn msg_types(&self) -> impl Iterator<Item = &str> {
        self.tx.body.messages.iter().map(|m| m.type_url.as_str())
    }
}
