//! # Transaction Envelope
//!
//! ```text
//! Tx ─┬─ body ──────┬─ messages: [Msg { type_url, value }]
//!     │             ├─ memo
//!     │             └─ timeout_height
//!     ├─ auth_info ─┬─ signer_infos: [{ public_key?, sequence }]
//!     │             └─ fee { amount, gas_limit, payer? }
//!     └─ signatures: [ed25519 over SignDoc]
//! ```
//!
//! The envelope and the sign document are bincode encoded. Message values
//! are opaque bytes decoded by the handler registered for `type_url`.

use ed25519_dalek::{Signer, SigningKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Address, Coins, Hash, PublicKey, TxError};

/// A message addressed to one module's handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub type_url: String,
    pub value: Vec<u8>,
}

impl Msg {
    /// Encode `value` as the payload of a message of type `type_url`.
    pub fn new<T: Serialize>(type_url: &str, value: &T) -> Result<Self, TxError> {
        let value = bincode::serialize(value).map_err(|e| TxError::tx_decode(e.to_string()))?;
        Ok(Self {
            type_url: type_url.to_string(),
            value,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TxError> {
        bincode::deserialize(&self.value)
            .map_err(|e| TxError::tx_decode(format!("{}: {}", self.type_url, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<Msg>,
    pub memo: String,
    /// Last height at which the transaction may be included; 0 disables.
    pub timeout_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    /// Required on the first transaction of an account; optional after.
    pub public_key: Option<PublicKey>,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Coins,
    pub gas_limit: u64,
    /// Defaults to the first signer.
    pub payer: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<Vec<u8>>,
}

/// Document each signer signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDoc {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub body: TxBody,
    pub auth_info: AuthInfo,
}

impl SignDoc {
    pub fn bytes(&self) -> Vec<u8> {
        // Encoding in-memory structs with only owned primitive fields
        // cannot fail.
        bincode::serialize(self).unwrap_or_default()
    }
}

impl Tx {
    /// Decode raw transaction bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, TxError> {
        bincode::deserialize(bytes).map_err(|e| TxError::tx_decode(e.to_string()))
    }

    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// SHA-256 of the encoded transaction.
    pub fn hash_bytes(bytes: &[u8]) -> Hash {
        Sha256::digest(bytes).into()
    }

    pub fn sign_doc(&self, chain_id: &str, account_number: u64, sequence: u64) -> SignDoc {
        SignDoc {
            chain_id: chain_id.to_string(),
            account_number,
            sequence,
            body: self.body.clone(),
            auth_info: self.auth_info.clone(),
        }
    }

    /// Explicit payer, or the first signer when unset.
    pub fn fee_payer(&self, signers: &[Address]) -> Option<Address> {
        self.auth_info
            .fee
            .payer
            .or_else(|| signers.first().copied())
    }
}

/// Key material and account coordinates for one signer.
pub struct SignerData<'k> {
    pub key: &'k SigningKey,
    pub account_number: u64,
    pub sequence: u64,
}

impl SignerData<'_> {
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.key.verifying_key().to_bytes())
    }

    pub fn address(&self) -> Address {
        Address::from_pubkey(&self.public_key())
    }
}

/// Assembles and signs transactions. Used by genesis tooling, the devnet
/// binary and tests.
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    body: TxBody,
    fee: Fee,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn msg(mut self, msg: Msg) -> Self {
        self.body.messages.push(msg);
        self
    }

    #[must_use]
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.body.memo = memo.into();
        self
    }

    #[must_use]
    pub fn timeout_height(mut self, height: u64) -> Self {
        self.body.timeout_height = height;
        self
    }

    #[must_use]
    pub fn fee(mut self, amount: Coins, gas_limit: u64) -> Self {
        self.fee.amount = amount;
        self.fee.gas_limit = gas_limit;
        self
    }

    #[must_use]
    pub fn payer(mut self, payer: Address) -> Self {
        self.fee.payer = Some(payer);
        self
    }

    /// Sign with every signer, in order. Public keys are always included.
    pub fn sign(self, chain_id: &str, signers: &[SignerData<'_>]) -> Tx {
        let mut tx = Tx {
            body: self.body,
            auth_info: AuthInfo {
                signer_infos: signers
                    .iter()
                    .map(|s| SignerInfo {
                        public_key: Some(s.public_key()),
                        sequence: s.sequence,
                    })
                    .collect(),
                fee: self.fee,
            },
            signatures: Vec::new(),
        };
        tx.signatures = signers
            .iter()
            .map(|s| {
                let doc = tx.sign_doc(chain_id, s.account_number, s.sequence);
                s.key.sign(&doc.bytes()).to_bytes().to_vec()
            })
            .collect();
        tx
    }
}
