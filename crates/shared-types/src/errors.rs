//! # Error Types
//!
//! Two error classes cross crate boundaries:
//!
//! | Class | Type | Meaning |
//! |-------|------|---------|
//! | Fatal | [`FatalError`] | Construction, genesis or lifecycle-hook failure. The node must stop before serving another block. |
//! | Rejected | [`TxError`] | One transaction is rejected; its result carries a code and log, execution continues. |
//!
//! Module crates define their own `thiserror` enums and convert into one of
//! the two classes at the module boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Codespace and codes of errors raised outside any particular module.
pub mod codes {
    pub const ROOT_CODESPACE: &str = "sdk";

    pub const OK: u32 = 0;
    pub const INTERNAL: u32 = 1;
    pub const TX_DECODE: u32 = 2;
    pub const INVALID_SEQUENCE: u32 = 3;
    pub const UNAUTHORIZED: u32 = 4;
    pub const INSUFFICIENT_FUNDS: u32 = 5;
    pub const UNKNOWN_REQUEST: u32 = 6;
    pub const INVALID_ADDRESS: u32 = 7;
    pub const INVALID_PUB_KEY: u32 = 8;
    pub const UNKNOWN_ADDRESS: u32 = 9;
    pub const INVALID_COINS: u32 = 10;
    pub const OUT_OF_GAS: u32 = 11;
    pub const MEMO_TOO_LARGE: u32 = 12;
    pub const INSUFFICIENT_FEE: u32 = 13;
    pub const TOO_MANY_SIGNATURES: u32 = 14;
    pub const NO_SIGNATURES: u32 = 15;
    pub const INVALID_REQUEST: u32 = 18;
    pub const INVALID_HEIGHT: u32 = 26;
    pub const TX_TIMEOUT_HEIGHT: u32 = 30;
    pub const WRONG_SEQUENCE: u32 = 32;
    pub const NOT_FOUND: u32 = 38;
}

/// A transaction-scoped, recoverable rejection.
///
/// This is what the sender of a transaction sees: a codespace naming the
/// component that rejected it, a stable numeric code and a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{log} (codespace: {codespace}, code: {code})")]
pub struct TxError {
    pub codespace: String,
    pub code: u32,
    pub log: String,
}

impl TxError {
    pub fn new(codespace: impl Into<String>, code: u32, log: impl Into<String>) -> Self {
        Self {
            codespace: codespace.into(),
            code,
            log: log.into(),
        }
    }

    fn root(code: u32, log: impl Into<String>) -> Self {
        Self::new(codes::ROOT_CODESPACE, code, log)
    }

    pub fn internal(log: impl Into<String>) -> Self {
        Self::root(codes::INTERNAL, log)
    }

    pub fn tx_decode(log: impl Into<String>) -> Self {
        Self::root(codes::TX_DECODE, log)
    }

    pub fn unauthorized(log: impl Into<String>) -> Self {
        Self::root(codes::UNAUTHORIZED, log)
    }

    pub fn insufficient_funds(log: impl Into<String>) -> Self {
        Self::root(codes::INSUFFICIENT_FUNDS, log)
    }

    pub fn unknown_request(log: impl Into<String>) -> Self {
        Self::root(codes::UNKNOWN_REQUEST, log)
    }

    pub fn invalid_address(log: impl Into<String>) -> Self {
        Self::root(codes::INVALID_ADDRESS, log)
    }

    pub fn invalid_pub_key(log: impl Into<String>) -> Self {
        Self::root(codes::INVALID_PUB_KEY, log)
    }

    pub fn unknown_address(log: impl Into<String>) -> Self {
        Self::root(codes::UNKNOWN_ADDRESS, log)
    }

    pub fn invalid_coins(log: impl Into<String>) -> Self {
        Self::root(codes::INVALID_COINS, log)
    }

    pub fn out_of_gas(log: impl Into<String>) -> Self {
        Self::root(codes::OUT_OF_GAS, log)
    }

    pub fn invalid_request(log: impl Into<String>) -> Self {
        Self::root(codes::INVALID_REQUEST, log)
    }

    pub fn not_found(log: impl Into<String>) -> Self {
        Self::root(codes::NOT_FOUND, log)
    }

    pub fn is(&self, codespace: &str, code: u32) -> bool {
        self.codespace == codespace && self.code == code
    }
}

/// An unrecoverable error. Continuing after one risks replicas diverging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("duplicate {kind} store key: {name}")]
    DuplicateStoreKey { name: String, kind: String },

    #[error("store partitions are sealed; cannot allocate {name}")]
    PartitionsSealed { name: String },

    #[error("store not mounted: {name}")]
    UnmountedStore { name: String },

    #[error("module registered twice: {name}")]
    DuplicateModule { name: String },

    #[error("{phase} order names unknown module {name}")]
    UnknownModule { phase: String, name: String },

    #[error("{phase} order lists module {name} more than once")]
    DuplicateInOrder { phase: String, name: String },

    #[error("{phase} order is missing modules: {missing:?}")]
    IncompleteOrder { phase: String, missing: Vec<String> },

    #[error("{phase} order lists {name}, which declares no {phase} hook")]
    UndeclaredHook { phase: String, name: String },

    #[error("{phase} order must run {before} before {after}")]
    OrderingViolation {
        phase: String,
        before: String,
        after: String,
    },

    #[error("keeper {keeper} depends on unregistered keeper {dependency}")]
    UnregisteredDependency { keeper: String, dependency: String },

    #[error("keeper dependency cycle: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("module {module} has no entry in the module account permission table")]
    MissingModulePermission { module: String },

    #[error("key table already bound for subspace {subspace}")]
    KeyTableAlreadySet { subspace: String },

    #[error("subspace registered twice: {subspace}")]
    DuplicateSubspace { subspace: String },

    #[error("parameter {key} is not registered in subspace {subspace}")]
    UnregisteredParam { subspace: String, key: String },

    #[error("capability keeper is sealed")]
    CapabilitySealed,

    #[error("scoped capability keeper created twice for module {module}")]
    DuplicateScope { module: String },

    #[error("cannot decode genesis state: {0}")]
    GenesisDecode(String),

    #[error("genesis failed in module {module}: {reason}")]
    Genesis { module: String, reason: String },

    #[error("{phase} hook failed in module {module}: {reason}")]
    Hook {
        module: String,
        phase: String,
        reason: String,
    },

    #[error("validator updates for {phase} already set by {previous}; {module} also returned updates")]
    DuplicateValidatorUpdates {
        phase: String,
        previous: String,
        module: String,
    },

    #[error("unexpected {call} while {phase}")]
    UnexpectedCall { call: String, phase: String },

    #[error("application halted: {reason}")]
    Halted { reason: String },

    #[error("store failure: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Either class of error, for APIs that can raise both.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),

    #[error("rejected: {0}")]
    Rejected(#[from] TxError),
}

impl AppError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Fatal(_))
    }
}
