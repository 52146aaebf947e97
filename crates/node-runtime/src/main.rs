//! # Modular-Chain Devnet Node
//!
//! Runs one [`ChainApp`] over the in-memory store and produces empty
//! blocks on a fixed interval, standing in for a consensus engine.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment (`MC_*` variables)
//! 2. Assemble the application (keepers, modules, routers, ante chain)
//! 3. Load the latest version
//! 4. Apply genesis from `MC_GENESIS_FILE`, or a one-validator devnet
//!    genesis keyed by `MC_DEVNET_KEY`
//! 5. Produce blocks until Ctrl+C

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use ed25519_dalek::SigningKey;
use parking_lot::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mc_01_store::InMemoryVersionedStore;
use mc_02_module::BlockHeader;
use node_runtime::app::{BeginBlockRequest, ChainApp, EndBlockRequest};
use node_runtime::container::AppConfig;
use node_runtime::genesis::{GenesisBuilder, GenesisDoc};
use shared_types::{Address, PublicKey};

/// Self bond of the devnet validator, in bond denom units.
const DEVNET_SELF_BOND: u128 = 100_000_000;

/// Owns the application and the block production task.
pub struct NodeRuntime {
    app: Arc<Mutex<ChainApp>>,
    proposer: Address,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl NodeRuntime {
    pub fn new(config: AppConfig, proposer: Address) -> Result<Self> {
        let mut app = ChainApp::new(config, Box::new(InMemoryVersionedStore::new()))
            .context("failed to assemble application")?;
        app.load_latest_version()
            .context("failed to load latest version")?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        Ok(Self {
            app: Arc::new(Mutex::new(app)),
            proposer,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn init_chain(&self, genesis: &GenesisDoc) -> Result<()> {
        let req = genesis
            .to_init_chain_request()
            .context("failed to encode genesis")?;
        let res = self.app.lock().init_chain(req).context("init_chain failed")?;
        info!(
            validators = res.validators.len(),
            app_hash = %hex::encode(res.app_hash),
            "Genesis applied"
        );
        Ok(())
    }

    /// Spawn the block producer.
    pub fn start(&self, block_time: Duration) {
        let app = Arc::clone(&self.app);
        let proposer = self.proposer;
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(block_time);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = produce_block(&app, proposer) {
                            error!("Block production stopped: {e:#}");
                            break;
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("[Devnet] Shutdown signal received");
                        break;
                    }
                }
            }
        });
    }

    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        let info = self.app.lock().info();
        info!(
            height = info.last_block_height,
            app_hash = %hex::encode(info.last_block_app_hash),
            "Shutdown complete"
        );
    }
}

fn produce_block(app: &Mutex<ChainApp>, proposer: Address) -> Result<()> {
    let mut app = app.lock();
    let height = app.last_block_height() + 1;
    let header = BlockHeader {
        chain_id: app.chain_id().to_string(),
        height,
        time: unix_now(),
        proposer,
    };
    app.begin_block(BeginBlockRequest { header })?;
    let end = app.end_block(EndBlockRequest { height })?;
    if !end.validator_updates.is_empty() {
        info!(updates = end.validator_updates.len(), "Validator set changed");
    }
    app.commit()?;
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn devnet_key() -> Result<SigningKey> {
    let Ok(key_hex) = std::env::var("MC_DEVNET_KEY") else {
        warn!("MC_DEVNET_KEY not set, using the well-known devnet key");
        return Ok(SigningKey::from_bytes(&[0x42; 32]));
    };
    let mut seed = [0u8; 32];
    if hex::decode_to_slice(key_hex.trim(), &mut seed).is_err() {
        bail!("MC_DEVNET_KEY must be 32 bytes (64 hex chars)");
    }
    Ok(SigningKey::from_bytes(&seed))
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);
    let json = std::env::var("MC_JSON_LOGS").is_ok_and(|v| v == "1");
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = AppConfig::from_env().context("invalid configuration")?;
    let block_time = Duration::from_millis(config.devnet.block_time_ms);
    let key = devnet_key()?;
    let proposer = Address::from_pubkey(&PublicKey(key.verifying_key().to_bytes()));

    let genesis = match std::env::var("MC_GENESIS_FILE") {
        Ok(path) => GenesisDoc::from_file(&path)
            .with_context(|| format!("failed to read genesis from {path}"))?,
        Err(_) => GenesisBuilder::devnet(config.chain_id.clone(), key, DEVNET_SELF_BOND)
            .bond_denom(config.devnet.bond_denom.clone())
            .genesis_time(unix_now())
            .build()
            .context("failed to build devnet genesis")?,
    };

    info!("===========================================");
    info!("  Modular-Chain Node v{}", node_runtime::app::APP_VERSION);
    info!("  Chain ID: {}", config.chain_id);
    info!("===========================================");

    let runtime = NodeRuntime::new(config, proposer)?;
    runtime.init_chain(&genesis)?;
    runtime.start(block_time);

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    runtime.shutdown().await;
    Ok(())
}
