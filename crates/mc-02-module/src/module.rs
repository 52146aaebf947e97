//! # Module Capabilities
//!
//! Each capability is its own narrow trait. A module implements only what it
//! uses and states the rest explicitly in its [`AppModule`] descriptor.

use crate::{Context, ModuleError, Msg};
use serde_json::Value;
use shared_types::{Address, TxError, ValidatorUpdate};
use std::fmt;
use std::sync::Arc;

/// Genesis import, export and validation.
pub trait Genesis: Send + Sync {
    fn default_genesis(&self) -> Value;

    /// Stateless validation of a genesis section.
    fn validate_genesis(&self, state: &Value) -> Result<(), ModuleError>;

    /// Write the module's initial state. At most one module may return a
    /// non-empty validator set.
    fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &Value,
    ) -> Result<Vec<ValidatorUpdate>, ModuleError>;

    fn export_genesis(&self, ctx: &mut Context<'_>) -> Result<Value, ModuleError>;
}

pub trait BeginBlockHook: Send + Sync {
    fn begin_block(&self, ctx: &mut Context<'_>) -> Result<(), ModuleError>;
}

pub trait EndBlockHook: Send + Sync {
    fn end_block(&self, ctx: &mut Context<'_>) -> Result<Vec<ValidatorUpdate>, ModuleError>;
}

/// Handles the messages a module owns.
pub trait MessageHandler: Send + Sync {
    /// Type URLs routed to this handler.
    fn message_types(&self) -> Vec<&'static str>;

    /// Stateless checks. Returns the addresses that must sign `msg`.
    fn validate_basic(&self, msg: &Msg) -> Result<Vec<Address>, TxError>;

    /// Execute `msg`; returns the result data. A [`ModuleError::Fatal`]
    /// halts the application, anything else rejects the transaction.
    fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, ModuleError>;
}

/// Read-only queries under `<route>/...`.
pub trait QueryHandler: Send + Sync {
    fn route(&self) -> &'static str;

    fn query(&self, ctx: &mut Context<'_>, path: &[&str], data: &[u8]) -> Result<Vec<u8>, TxError>;
}

/// Stateless message inspection used by the admission pipeline.
pub trait MsgValidator: Send + Sync {
    /// Validate `msg` and return its required signers. Unknown type URLs are
    /// rejected.
    fn validate_msg(&self, msg: &Msg) -> Result<Vec<Address>, TxError>;
}

/// How a module takes part in one lifecycle phase.
pub enum Hook<T: ?Sized> {
    /// The module does not take part and must not appear in the order.
    Absent,
    /// The module keeps a slot in the order but does no work.
    NoOp,
    Active(Arc<T>),
}

impl<T: ?Sized> Hook<T> {
    /// True for `NoOp` and `Active`: the module must be listed in the order.
    pub fn is_declared(&self) -> bool {
        !matches!(self, Hook::Absent)
    }

    pub fn active(&self) -> Option<&Arc<T>> {
        match self {
            Hook::Active(h) => Some(h),
            _ => None,
        }
    }
}

impl<T: ?Sized> Clone for Hook<T> {
    fn clone(&self) -> Self {
        match self {
            Hook::Absent => Hook::Absent,
            Hook::NoOp => Hook::NoOp,
            Hook::Active(h) => Hook::Active(Arc::clone(h)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Absent => f.write_str("Absent"),
            Hook::NoOp => f.write_str("NoOp"),
            Hook::Active(_) => f.write_str("Active"),
        }
    }
}

/// A module as the manager sees it.
#[derive(Clone)]
pub struct AppModule {
    pub name: String,
    pub consensus_version: u64,
    pub genesis: Hook<dyn Genesis>,
    pub begin_block: Hook<dyn BeginBlockHook>,
    pub end_block: Hook<dyn EndBlockHook>,
    pub msg_handler: Option<Arc<dyn MessageHandler>>,
    pub query_handler: Option<Arc<dyn QueryHandler>>,
}

impl AppModule {
    /// A module with every capability absent.
    pub fn new(name: impl Into<String>, consensus_version: u64) -> Self {
        Self {
            name: name.into(),
            consensus_version,
            genesis: Hook::Absent,
            begin_block: Hook::Absent,
            end_block: Hook::Absent,
            msg_handler: None,
            query_handler: None,
        }
    }

    #[must_use]
    pub fn with_genesis(mut self, hook: Hook<dyn Genesis>) -> Self {
        self.genesis = hook;
        self
    }

    #[must_use]
    pub fn with_begin_block(mut self, hook: Hook<dyn BeginBlockHook>) -> Self {
        self.begin_block = hook;
        self
    }

    #[must_use]
    pub fn with_end_block(mut self, hook: Hook<dyn EndBlockHook>) -> Self {
        self.end_block = hook;
        self
    }

    #[must_use]
    pub fn with_msg_handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.msg_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn with_query_handler(mut self, handler: Arc<dyn QueryHandler>) -> Self {
        self.query_handler = Some(handler);
        self
    }
}

impl fmt::Debug for AppModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppModule")
            .field("name", &self.name)
            .field("consensus_version", &self.consensus_version)
            .field("genesis", &self.genesis)
            .field("begin_block", &self.begin_block)
            .field("end_block", &self.end_block)
            .field("msg_handler", &self.msg_handler.is_some())
            .field("query_handler", &self.query_handler.is_some())
            .finish()
    }
}

/// A keeper's declared dependencies on other keepers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperInfo {
    pub name: &'static str,
    pub depends_on: Vec<&'static str>,
}

impl KeeperInfo {
    pub fn new(name: &'static str, depends_on: &[&'static str]) -> Self {
        Self {
            name,
            depends_on: depends_on.to_vec(),
        }
    }
}

/// Parse a JSON genesis section, mapping failures to [`ModuleError`].
pub fn parse_genesis<T: serde::de::DeserializeOwned>(state: &Value) -> Result<T, ModuleError> {
    serde_json::from_value(state.clone()).map_err(|e| ModuleError::InvalidGenesis(e.to_string()))
}

/// Serialize a genesis section. Only fails on non-string map keys, which no
/// genesis type uses.
pub fn to_genesis_value<T: serde::Serialize>(state: &T) -> Result<Value, ModuleError> {
    serde_json::to_value(state).map_err(|e| ModuleError::InvalidGenesis(e.to_string()))
}
