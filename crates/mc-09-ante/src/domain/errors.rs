use mc_01_store::StoreError;
use mc_02_module::ModuleError;
use mc_04_auth::AuthError;
use shared_types::{codes, Address, Coins, TxError};
use thiserror::Error;

/// Reasons the admission pipeline rejects a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnteError {
    #[error("transaction has no messages")]
    NoMessages,

    #[error("transaction has no signatures")]
    NoSignatures,

    /// Signature and signer-info counts must match the required signers.
    #[error("wrong number of signatures: expected {expected}, got {got}")]
    SignerCountMismatch { expected: usize, got: usize },

    #[error("gas limit must be positive")]
    ZeroGas,

    #[error("transaction timed out at height {timeout}, current height {height}")]
    TimedOut { timeout: u64, height: u64 },

    #[error("memo of {got} characters exceeds the maximum of {max}")]
    MemoTooLarge { max: u64, got: u64 },

    #[error("{got} signatures exceed the limit of {max}")]
    TooManySignatures { max: u64, got: u64 },

    #[error("account {0} does not exist")]
    UnknownAccount(Address),

    #[error("module account {0} cannot sign")]
    ModuleAccountSigner(Address),

    #[error("public key does not belong to signer {0}")]
    PubKeyMismatch(Address),

    #[error("public key of {0} is not set")]
    MissingPubKey(Address),

    /// A stale or future sequence: the transaction is a replay or out of
    /// order.
    #[error("account sequence mismatch for {address}: expected {expected}, got {got}")]
    WrongSequence {
        address: Address,
        expected: u64,
        got: u64,
    },

    #[error("signature verification failed for {0}")]
    InvalidSignature(Address),

    #[error("fee payer {0} is not a signer")]
    PayerNotSigner(Address),

    #[error("insufficient fee: got {got}, required {required}")]
    InsufficientFee { required: Coins, got: Coins },

    #[error(transparent)]
    Rejected(#[from] TxError),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl From<StoreError> for AnteError {
    fn from(err: StoreError) -> Self {
        Self::Module(err.into())
    }
}

impl From<AuthError> for AnteError {
    fn from(err: AuthError) -> Self {
        Self::Module(err.into())
    }
}

impl From<AnteError> for TxError {
    fn from(err: AnteError) -> Self {
        let code = match &err {
            AnteError::NoMessages | AnteError::ZeroGas => codes::INVALID_REQUEST,
            AnteError::NoSignatures => codes::NO_SIGNATURES,
            AnteError::SignerCountMismatch { .. } | AnteError::PayerNotSigner(_) => {
                codes::UNAUTHORIZED
            }
            AnteError::TimedOut { .. } => codes::TX_TIMEOUT_HEIGHT,
            AnteError::MemoTooLarge { .. } => codes::MEMO_TOO_LARGE,
            AnteError::TooManySignatures { .. } => codes::TOO_MANY_SIGNATURES,
            AnteError::UnknownAccount(_) => codes::UNKNOWN_ADDRESS,
            AnteError::ModuleAccountSigner(_) => codes::UNAUTHORIZED,
            AnteError::PubKeyMismatch(_) | AnteError::MissingPubKey(_) => codes::INVALID_PUB_KEY,
            AnteError::WrongSequence { .. } => codes::WRONG_SEQUENCE,
            AnteError::InvalidSignature(_) => codes::UNAUTHORIZED,
            AnteError::InsufficientFee { .. } => codes::INSUFFICIENT_FEE,
            AnteError::Rejected(e) => return e.clone(),
            AnteError::Module(e) => return e.clone().into(),
        };
        TxError::new(codes::ROOT_CODESPACE, code, err.to_string())
    }
}

impl AnteError {
    /// Fatal store or keeper failures must halt the node rather than
    /// reject one transaction.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnteError::Module(ModuleError::Fatal(_)))
    }
}
