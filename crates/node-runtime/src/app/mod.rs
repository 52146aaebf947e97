//! # Chain Application
//!
//! [`ChainApp`] is the block lifecycle controller driven by consensus:
//!
//! ```text
//! Uninitialized ──load──► Ready ──init_chain──► Ready
//!                           │
//!                           ▼
//!      begin_block ──► deliver_tx* ──► end_block ──► commit ──► Committed
//!           ▲                                                      │
//!           └──────────────────────────────────────────────────────┘
//!
//! any fatal error ──► Halted (terminal)
//! ```
//!
//! Deliver runs on the root working state. Check runs on a branch of the
//! last committed version whose writes are retained between checks and
//! dropped at commit, so transactions delivered in the open block are not
//! visible to it. Queries read committed snapshots only.

pub mod runner;
pub mod types;

pub use runner::*;
pub use types::*;

use crate::adapters::{AuthAdapter, BankAdapter, GenesisTxAdapter, StakingAdapter};
use crate::container::{AppConfig, KeeperContainer};
use crate::registry::{GenesisState, ModuleManager};
use crate::wiring::{MsgRouter, QueryRouter};
use mc_01_store::{CacheMultiStore, MultiStore, VersionedStore, WriteSet};
use mc_02_module::{BlockHeader, Context, ExecMode, GasMeter, MsgValidator, Tx};
use shared_types::{FatalError, TxError};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query paths served by the application itself rather than a module.
pub mod app_queries {
    pub const PREFIX: &str = "app";
    pub const VERSION: &str = "app/version";
    pub const MODULE_VERSIONS: &str = "app/module_versions";
}

struct BlockInProgress {
    header: BlockHeader,
    results: Vec<TxResult>,
}

pub struct ChainApp {
    config: AppConfig,
    keepers: KeeperContainer,
    store: MultiStore,
    manager: ModuleManager,
    runner: Arc<TxRunner>,
    queries: QueryRouter,
    phase: AppPhase,
    chain_id: String,
    /// Header of the last committed (or genesis) block; check and simulate
    /// run against it.
    last_header: BlockHeader,
    block: Option<BlockInProgress>,
    check_writes: WriteSet,
    /// Genesis has been applied, in this process or before the loaded
    /// version was committed.
    initialized: bool,
}

impl ChainApp {
    /// Assemble every keeper, module and router over `backend`.
    ///
    /// Construction order: keepers, modules, message router, admission
    /// chain, runner, genutil, module manager. The application starts
    /// [`AppPhase::Uninitialized`]; call [`Self::load_latest_version`].
    pub fn new(config: AppConfig, backend: Box<dyn VersionedStore>) -> Result<Self, FatalError> {
        config.validate()?;
        let keepers = KeeperContainer::new(&config)?;

        let mut modules = vec![
            mc_07_capability::app_module(keepers.capability.clone()),
            mc_04_auth::app_module(keepers.auth.clone()),
            mc_05_bank::app_module(keepers.bank.clone()),
            mc_06_staking::app_module(keepers.staking.clone()),
            mc_03_params::app_module(keepers.params.clone()),
        ];
        let router = Arc::new(MsgRouter::new(&modules)?);

        let auth = Arc::new(AuthAdapter::new(keepers.auth.clone()));
        let ante = mc_09_ante::AnteHandler::new(mc_09_ante::HandlerOptions {
            account_keeper: Some(auth as Arc<dyn mc_09_ante::AccountKeeper>),
            bank_keeper: Some(Arc::new(BankAdapter::new(keepers.bank.clone()))
                as Arc<dyn mc_09_ante::BankKeeper>),
            msg_validator: Some(router.clone() as Arc<dyn MsgValidator>),
            fee_policy: config.ante.clone(),
        })?;
        let runner = Arc::new(TxRunner::new(ante, router));

        modules.push(mc_08_genutil::app_module(
            Arc::new(GenesisTxAdapter::new(runner.clone())),
            Arc::new(StakingAdapter::new(keepers.staking.clone())),
        ));
        let queries = QueryRouter::new(&modules)?;
        let manager = ModuleManager::new(modules, config.orders.clone(), &config.constraints)?;
        let store = keepers.mount(backend)?;

        info!(
            chain_id = %config.chain_id,
            modules = manager.module_names().len(),
            decorators = ?runner.ante().decorator_names(),
            "[App] application assembled"
        );
        Ok(Self {
            chain_id: config.chain_id.clone(),
            last_header: BlockHeader {
                chain_id: config.chain_id.clone(),
                ..BlockHeader::default()
            },
            config,
            keepers,
            store,
            manager,
            runner,
            queries,
            phase: AppPhase::Uninitialized,
            block: None,
            check_writes: WriteSet::default(),
            initialized: false,
        })
    }

    pub fn phase(&self) -> &AppPhase {
        &self.phase
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.phase, AppPhase::Halted { .. })
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn keepers(&self) -> &KeeperContainer {
        &self.keepers
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    pub fn runner(&self) -> &TxRunner {
        &self.runner
    }

    pub fn last_block_height(&self) -> u64 {
        self.store.latest_version()
    }

    /// Default genesis of every registered module.
    pub fn default_genesis(&self) -> GenesisState {
        self.manager.default_genesis()
    }

    pub fn load_latest_version(&mut self) -> Result<(), FatalError> {
        let latest = self.store.latest_version();
        self.load_version(latest)
    }

    /// Roll back to committed `height`. Memory partitions are rebuilt by
    /// the next begin-block.
    pub fn load_version(&mut self, height: u64) -> Result<(), FatalError> {
        self.ensure("load_version", |p| {
            matches!(p, AppPhase::Uninitialized | AppPhase::Ready | AppPhase::Committed)
        })?;
        self.store.load_version(height)?;
        self.block = None;
        self.check_writes = WriteSet::default();
        self.last_header = BlockHeader {
            chain_id: self.chain_id.clone(),
            height,
            ..BlockHeader::default()
        };
        self.initialized = height > 0;
        self.phase = AppPhase::Ready;
        info!(height, "[App] version loaded");
        Ok(())
    }

    /// Validate and apply the genesis document. Only valid before the
    /// first block; the resulting state is committed with block 1.
    pub fn init_chain(&mut self, req: InitChainRequest) -> Result<InitChainResponse, FatalError> {
        let _span = info_span!("init_chain", chain_id = %req.chain_id).entered();
        self.ensure("init_chain", |p| matches!(p, AppPhase::Ready))?;
        if self.initialized || self.store.latest_version() != 0 {
            return Err(FatalError::UnexpectedCall {
                call: "init_chain".into(),
                phase: format!("initialized at height {}", self.store.latest_version()),
            });
        }
        if req.chain_id != self.chain_id {
            let err = FatalError::Config(format!(
                "genesis chain id {} does not match configured {}",
                req.chain_id, self.chain_id
            ));
            return Err(self.halt(err));
        }

        self.phase = AppPhase::InGenesis;
        let header = BlockHeader {
            chain_id: req.chain_id,
            height: 0,
            time: req.genesis_time,
            ..BlockHeader::default()
        };
        let result = self.run_genesis(&header, &req.app_state_bytes);
        let validators = match result {
            Ok(v) => v,
            Err(err) => return Err(self.halt(err)),
        };

        self.last_header = header;
        self.initialized = true;
        self.phase = AppPhase::Ready;
        let app_hash = self.store.working_hash();
        info!(
            validators = validators.len(),
            app_hash = %hex::encode(app_hash),
            "[App] genesis applied"
        );
        Ok(InitChainResponse {
            validators,
            app_hash,
        })
    }

    fn run_genesis(
        &mut self,
        header: &BlockHeader,
        app_state_bytes: &[u8],
    ) -> Result<Vec<shared_types::ValidatorUpdate>, FatalError> {
        let state: GenesisState = if app_state_bytes.is_empty() {
            GenesisState::new()
        } else {
            serde_json::from_slice(app_state_bytes)
                .map_err(|e| FatalError::GenesisDecode(e.to_string()))?
        };
        self.manager.validate_genesis(&state)?;
        let mut ctx = Context::new(&mut self.store, header.clone(), ExecMode::Genesis);
        self.manager.init_genesis(&mut ctx, &state)
    }

    pub fn begin_block(&mut self, req: BeginBlockRequest) -> Result<BeginBlockResponse, FatalError> {
        let header = req.header;
        let _span = info_span!("begin_block", height = header.height).entered();
        self.ensure("begin_block", |p| matches!(p, AppPhase::Ready | AppPhase::Committed))?;
        if !self.initialized {
            return Err(self.unexpected("begin_block before init_chain"));
        }

        let expected = self.store.latest_version() + 1;
        if header.height != expected {
            return Err(self.halt(FatalError::UnexpectedCall {
                call: format!("begin_block at height {}", header.height),
                phase: format!("expecting height {expected}"),
            }));
        }
        if header.chain_id != self.chain_id {
            return Err(self.halt(FatalError::Config(format!(
                "block chain id {} does not match {}",
                header.chain_id, self.chain_id
            ))));
        }

        self.store.reset_transient();
        let mut ctx = Context::new(&mut self.store, header.clone(), ExecMode::BeginBlock);
        let result = self.manager.begin_block(&mut ctx);
        let events = ctx.take_events();
        drop(ctx);
        if let Err(err) = result {
            return Err(self.halt(err));
        }

        self.block = Some(BlockInProgress {
            header,
            results: Vec::new(),
        });
        self.phase = AppPhase::InBlock(BlockStage::Began);
        Ok(BeginBlockResponse { events })
    }

    /// Execute one transaction of the current block.
    ///
    /// A rejected transaction is a [`TxResult`] with a non-zero code; only
    /// failures that must stop the chain are returned as `Err`.
    pub fn deliver_tx(&mut self, tx_bytes: &[u8]) -> Result<TxResult, FatalError> {
        self.ensure("deliver_tx", |p| matches!(p, AppPhase::InBlock(BlockStage::Began)))?;
        let header = match &self.block {
            Some(block) => block.header.clone(),
            None => return Err(self.unexpected("deliver_tx")),
        };
        let _span = info_span!("deliver_tx", height = header.height).entered();

        let result = match Tx::decode(tx_bytes) {
            Ok(tx) => {
                let gas_limit = tx.auth_info.fee.gas_limit;
                let runner = self.runner.clone();
                let mut ctx = Context::new(&mut self.store, header, ExecMode::Deliver)
                    .with_gas_meter(GasMeter::new(gas_limit));
                let outcome = runner.execute(&mut ctx, &tx, tx_bytes.len() as u64);
                let gas_used = ctx.gas_meter().consumed_to_limit();
                let events = ctx.take_events();
                drop(ctx);
                match outcome {
                    Ok(outcome) => tx_result(outcome, gas_limit, gas_used, events),
                    Err(err) => return Err(self.halt(err)),
                }
            }
            Err(err) => TxResult::rejected(err, 0, 0, Vec::new()),
        };

        debug!(code = result.code, gas_used = result.gas_used, "[App] transaction delivered");
        if let Some(block) = self.block.as_mut() {
            block.results.push(result.clone());
        }
        Ok(result)
    }

    pub fn end_block(&mut self, req: EndBlockRequest) -> Result<EndBlockResponse, FatalError> {
        let _span = info_span!("end_block", height = req.height).entered();
        self.ensure("end_block", |p| matches!(p, AppPhase::InBlock(BlockStage::Began)))?;
        let header = match &self.block {
            Some(block) if block.header.height == req.height => block.header.clone(),
            _ => return Err(self.unexpected("end_block")),
        };

        let mut ctx = Context::new(&mut self.store, header, ExecMode::EndBlock);
        let result = self.manager.end_block(&mut ctx);
        let events = ctx.take_events();
        drop(ctx);
        let validator_updates = match result {
            Ok(updates) => updates,
            Err(err) => return Err(self.halt(err)),
        };

        self.phase = AppPhase::InBlock(BlockStage::Ended);
        Ok(EndBlockResponse {
            validator_updates,
            events,
        })
    }

    /// Persist the block. Rejected, without touching state, unless a block
    /// has been ended.
    pub fn commit(&mut self) -> Result<CommitResponse, FatalError> {
        self.ensure("commit", |p| matches!(p, AppPhase::InBlock(BlockStage::Ended)))?;
        let Some(block) = self.block.take() else {
            return Err(self.unexpected("commit"));
        };
        let _span = info_span!("commit", height = block.header.height).entered();

        let id = match self.store.commit() {
            Ok(id) => id,
            Err(err) => return Err(self.halt(err.into())),
        };
        if id.version != block.header.height {
            return Err(self.halt(FatalError::Store(format!(
                "committed version {} for block {}",
                id.version, block.header.height
            ))));
        }

        self.check_writes = WriteSet::default();
        self.last_header = block.header;
        self.phase = AppPhase::Committed;
        info!(
            height = id.version,
            txs = block.results.len(),
            app_hash = %hex::encode(id.hash),
            "[App] block committed"
        );
        Ok(CommitResponse {
            height: id.version,
            app_hash: id.hash,
        })
    }

    /// Admission only, against the retained check state.
    pub fn check_tx(&mut self, tx_bytes: &[u8], kind: CheckTxKind) -> Result<TxResult, FatalError> {
        self.ensure_serving("check_tx")?;
        let tx = match Tx::decode(tx_bytes) {
            Ok(tx) => tx,
            Err(err) => return Ok(TxResult::rejected(err, 0, 0, Vec::new())),
        };
        let gas_limit = tx.auth_info.fee.gas_limit;
        let runner = self.runner.clone();
        let writes = std::mem::take(&mut self.check_writes);
        let (outcome, gas_used, events, writes) = {
            let mut snapshot = self.store.snapshot(None)?;
            let mut cache = CacheMultiStore::with_writes(&mut snapshot, writes);
            let mut ctx = Context::new(&mut cache, self.last_header.clone(), ExecMode::Check)
                .with_gas_meter(GasMeter::new(gas_limit));
            let outcome = runner.admit(&mut ctx, &tx, tx_bytes.len() as u64);
            let gas_used = ctx.gas_meter().consumed_to_limit();
            let events = ctx.take_events();
            drop(ctx);
            (outcome, gas_used, events, cache.into_writes())
        };
        self.check_writes = writes;

        match outcome {
            Ok(outcome) => {
                debug!(?kind, accepted = outcome.is_ok(), "[App] transaction checked");
                Ok(tx_result(outcome.map(|()| Vec::new()), gas_limit, gas_used, events))
            }
            Err(err) => Err(self.halt(err)),
        }
    }

    /// Full execution on a discarded branch of the check state, for gas
    /// estimation.
    pub fn simulate(&mut self, tx_bytes: &[u8]) -> Result<TxResult, FatalError> {
        self.ensure_serving("simulate")?;
        let tx = match Tx::decode(tx_bytes) {
            Ok(tx) => tx,
            Err(err) => return Ok(TxResult::rejected(err, 0, 0, Vec::new())),
        };
        let gas_limit = tx.auth_info.fee.gas_limit;
        let runner = self.runner.clone();
        let (outcome, gas_used, events) = {
            let mut snapshot = self.store.snapshot(None)?;
            let mut cache = CacheMultiStore::with_writes(&mut snapshot, self.check_writes.clone());
            let mut ctx = Context::new(&mut cache, self.last_header.clone(), ExecMode::Simulate)
                .with_gas_meter(GasMeter::new(gas_limit));
            let outcome = runner.execute(&mut ctx, &tx, tx_bytes.len() as u64);
            let gas_used = ctx.gas_meter().consumed_to_limit();
            let events = ctx.take_events();
            (outcome, gas_used, events)
        };

        match outcome {
            Ok(outcome) => Ok(tx_result(outcome, gas_limit, gas_used, events)),
            Err(err) => Err(self.halt(err)),
        }
    }

    /// Read committed state at `req.height` (latest when 0).
    pub fn query(&self, req: &QueryRequest) -> QueryResponse {
        let latest = self.store.latest_version();
        let height = if req.height == 0 { latest } else { req.height };
        if let Err(err) = self.ensure_serving("query") {
            return QueryResponse::from_result(height, Err(TxError::internal(err.to_string())));
        }

        if req.path.split('/').next() == Some(app_queries::PREFIX) {
            return QueryResponse::from_result(height, self.app_query(&req.path));
        }

        let mut snapshot = match self.store.snapshot(Some(height)) {
            Ok(s) => s,
            Err(err) => {
                return QueryResponse::from_result(
                    height,
                    Err(TxError::invalid_request(err.to_string())),
                )
            }
        };
        let header = BlockHeader {
            chain_id: self.chain_id.clone(),
            height,
            ..BlockHeader::default()
        };
        let mut ctx = Context::new(&mut snapshot, header, ExecMode::Query);
        let result = self.queries.query(&mut ctx, &req.path, &req.data);
        QueryResponse::from_result(height, result)
    }

    fn app_query(&self, path: &str) -> Result<Vec<u8>, TxError> {
        let value = match path {
            app_queries::VERSION => serde_json::to_vec(APP_VERSION),
            app_queries::MODULE_VERSIONS => serde_json::to_vec(&self.manager.version_map()),
            other => return Err(TxError::unknown_request(format!("unknown query path {other}"))),
        };
        value.map_err(|e| TxError::internal(e.to_string()))
    }

    pub fn info(&self) -> InfoResponse {
        let last = self.store.last_commit();
        InfoResponse {
            app_version: APP_VERSION.to_string(),
            last_block_height: last.version,
            last_block_app_hash: last.hash,
            module_versions: self.manager.version_map(),
        }
    }

    /// Export every module's state at the latest committed height.
    pub fn export_app_state(&self) -> Result<ExportedApp, FatalError> {
        let last = self.store.last_commit();
        let mut snapshot = self.store.snapshot(None)?;
        let mut cache = CacheMultiStore::new(&mut snapshot);
        let header = BlockHeader {
            chain_id: self.chain_id.clone(),
            height: last.version,
            ..BlockHeader::default()
        };
        let mut ctx = Context::new(&mut cache, header, ExecMode::Query);
        let app_state = self.manager.export_genesis(&mut ctx)?;
        info!(height = last.version, "[App] state exported");
        Ok(ExportedApp {
            height: last.version,
            app_state,
            app_hash: last.hash,
        })
    }

    fn ensure(&self, call: &str, allowed: impl Fn(&AppPhase) -> bool) -> Result<(), FatalError> {
        if let AppPhase::Halted { reason } = &self.phase {
            return Err(FatalError::Halted {
                reason: reason.clone(),
            });
        }
        if allowed(&self.phase) {
            return Ok(());
        }
        warn!(call, phase = %self.phase, "[App] call rejected in current phase");
        Err(self.unexpected(call))
    }

    fn ensure_serving(&self, call: &str) -> Result<(), FatalError> {
        self.ensure(call, |p| {
            !matches!(p, AppPhase::Uninitialized | AppPhase::InGenesis)
        })
    }

    fn unexpected(&self, call: &str) -> FatalError {
        FatalError::UnexpectedCall {
            call: call.to_string(),
            phase: self.phase.to_string(),
        }
    }

    /// Enter the terminal phase. Uncommitted writes are dropped so the last
    /// committed version stays the only durable state.
    fn halt(&mut self, err: FatalError) -> FatalError {
        error!(error = %err, phase = %self.phase, "[App] fatal error, halting");
        self.store.discard_working();
        self.block = None;
        self.check_writes = WriteSet::default();
        self.phase = AppPhase::Halted {
            reason: err.to_string(),
        };
        err
    }
}

fn tx_result(
    outcome: TxOutcome,
    gas_wanted: u64,
    gas_used: u64,
    events: Vec<shared_types::Event>,
) -> TxResult {
    match outcome {
        Ok(data) => TxResult::ok(data, gas_wanted, gas_used, events),
        Err(err) => TxResult::rejected(err, gas_wanted, gas_used, events),
    }
}
