//! # Block Context
//!
//! A [`Context`] is created for each lifecycle call and each transaction and
//! dropped when the step ends. It carries the block header, the execution
//! mode, a gas meter, an event buffer and a mutable handle to the store view
//! for this step (root, cache branch or snapshot).

use crate::{EventManager, GasMeter, KvGasConfig, KvStore, ModuleError};
use mc_01_store::{CacheMultiStore, StoreBackend, StoreError, StoreKey, StoreKind};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Event};

/// Header of the block being executed, as supplied by consensus.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub chain_id: String,
    pub height: u64,
    /// Block time in seconds since the Unix epoch, taken from consensus.
    pub time: u64,
    pub proposer: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecMode {
    Genesis,
    BeginBlock,
    Check,
    Simulate,
    Deliver,
    EndBlock,
    Query,
}

pub struct Context<'a> {
    store: &'a mut dyn StoreBackend,
    header: BlockHeader,
    mode: ExecMode,
    gas: GasMeter,
    events: EventManager,
}

impl<'a> Context<'a> {
    /// Context with an infinite gas meter.
    pub fn new(store: &'a mut dyn StoreBackend, header: BlockHeader, mode: ExecMode) -> Self {
        Self {
            store,
            header,
            mode,
            gas: GasMeter::infinite(),
            events: EventManager::new(),
        }
    }

    #[must_use]
    pub fn with_gas_meter(mut self, gas: GasMeter) -> Self {
        self.gas = gas;
        self
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn chain_id(&self) -> &str {
        &self.header.chain_id
    }

    pub fn block_height(&self) -> u64 {
        self.header.height
    }

    pub fn block_time(&self) -> u64 {
        self.header.time
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn is_check_tx(&self) -> bool {
        matches!(self.mode, ExecMode::Check | ExecMode::Simulate)
    }

    pub fn gas_meter(&self) -> &GasMeter {
        &self.gas
    }

    pub fn gas_meter_mut(&mut self) -> &mut GasMeter {
        &mut self.gas
    }

    pub fn consume_gas(&mut self, amount: u64, descriptor: &str) -> Result<(), ModuleError> {
        self.gas.consume(amount, descriptor)
    }

    /// Gas-metered handle to one partition.
    pub fn kv<'c>(&'c mut self, store: &'c StoreKey) -> KvStore<'c> {
        let config = match store.kind() {
            StoreKind::Persistent => KvGasConfig::PERSISTENT,
            StoreKind::Transient | StoreKind::Memory => KvGasConfig::TRANSIENT,
        };
        KvStore::new(&mut *self.store, &mut self.gas, store, config)
    }

    pub fn emit(&mut self, event: Event) {
        self.events.emit(event);
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take()
    }

    /// Run `f` on a cache branch of this context.
    ///
    /// On success the branch's writes are flushed and its events appended;
    /// on failure both are discarded. Gas used inside the branch is charged
    /// either way.
    pub fn branch<T, E>(&mut self, f: impl FnOnce(&mut Context<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut cache = CacheMultiStore::new(&mut *self.store);
        let (result, gas, events) = {
            let mut sub = Context {
                store: &mut cache,
                header: self.header.clone(),
                mode: self.mode,
                gas: self.gas.clone(),
                events: EventManager::new(),
            };
            let result = f(&mut sub);
            (result, sub.gas, sub.events)
        };
        self.gas.set_consumed(gas.consumed());
        let value = result?;
        cache.write()?;
        self.events.extend(events.into_events());
        Ok(value)
    }
}
