//! Requests and responses exchanged with the consensus engine.

use mc_02_module::BlockHeader;
use serde::{Deserialize, Serialize};
use shared_types::{codes, Event, Hash, TxError, ValidatorUpdate};
use std::collections::BTreeMap;
use std::fmt;

/// Where the application is in the block lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppPhase {
    /// Constructed; no version loaded yet.
    Uninitialized,
    Ready,
    InGenesis,
    InBlock(BlockStage),
    Committed,
    /// Terminal. Every further call is rejected.
    Halted { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStage {
    Began,
    Ended,
}

impl fmt::Display for AppPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Ready => f.write_str("ready"),
            Self::InGenesis => f.write_str("in genesis"),
            Self::InBlock(BlockStage::Began) => f.write_str("in block (began)"),
            Self::InBlock(BlockStage::Ended) => f.write_str("in block (ended)"),
            Self::Committed => f.write_str("committed"),
            Self::Halted { .. } => f.write_str("halted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitChainRequest {
    pub chain_id: String,
    /// Genesis time in seconds since the Unix epoch.
    pub genesis_time: u64,
    /// JSON object of genesis sections keyed by module name.
    pub app_state_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitChainResponse {
    pub validators: Vec<ValidatorUpdate>,
    /// Root of the working state after genesis; committed with block 1.
    pub app_hash: Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginBlockRequest {
    pub header: BlockHeader,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginBlockResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndBlockRequest {
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndBlockResponse {
    pub validator_updates: Vec<ValidatorUpdate>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    pub height: u64,
    pub app_hash: Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckTxKind {
    New,
    Recheck,
}

/// Result of one transaction as returned to consensus and the sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub events: Vec<Event>,
    pub data: Vec<u8>,
}

impl TxResult {
    pub fn ok(data: Vec<u8>, gas_wanted: u64, gas_used: u64, events: Vec<Event>) -> Self {
        Self {
            code: codes::OK,
            gas_wanted,
            gas_used,
            events,
            data,
            ..Self::default()
        }
    }

    pub fn rejected(err: TxError, gas_wanted: u64, gas_used: u64, events: Vec<Event>) -> Self {
        Self {
            code: err.code,
            codespace: err.codespace,
            log: err.log,
            gas_wanted,
            gas_used,
            events,
            data: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == codes::OK
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub path: String,
    #[serde(default)]
    pub data: Vec<u8>,
    /// Committed height to read; 0 means the latest.
    #[serde(default)]
    pub height: u64,
}

impl QueryRequest {
    pub fn latest(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: Vec::new(),
            height: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub height: u64,
    pub value: Vec<u8>,
}

impl QueryResponse {
    pub fn is_ok(&self) -> bool {
        self.code == codes::OK
    }

    pub(crate) fn from_result(height: u64, result: Result<Vec<u8>, TxError>) -> Self {
        match result {
            Ok(value) => Self {
                height,
                value,
                ..Self::default()
            },
            Err(err) => Self {
                code: err.code,
                codespace: err.codespace,
                log: err.log,
                height,
                value: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub app_version: String,
    pub last_block_height: u64,
    pub last_block_app_hash: Hash,
    pub module_versions: BTreeMap<String, u64>,
}

/// State exported at the latest committed height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedApp {
    pub height: u64,
    pub app_state: BTreeMap<String, serde_json::Value>,
    pub app_hash: Hash,
}
