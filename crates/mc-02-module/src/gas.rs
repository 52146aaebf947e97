//! # Gas Accounting
//!
//! Costs follow the KV gas schedule: a flat charge per operation plus a
//! per-byte charge on keys and values. Transient and memory partitions use
//! the cheaper schedule.

use crate::ModuleError;

/// Per-operation gas costs for store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KvGasConfig {
    pub has_cost: u64,
    pub delete_cost: u64,
    pub read_cost_flat: u64,
    pub read_cost_per_byte: u64,
    pub write_cost_flat: u64,
    pub write_cost_per_byte: u64,
    pub iter_next_cost_flat: u64,
}

impl KvGasConfig {
    pub const PERSISTENT: Self = Self {
        has_cost: 1000,
        delete_cost: 1000,
        read_cost_flat: 1000,
        read_cost_per_byte: 3,
        write_cost_flat: 2000,
        write_cost_per_byte: 30,
        iter_next_cost_flat: 30,
    };

    pub const TRANSIENT: Self = Self {
        has_cost: 100,
        delete_cost: 100,
        read_cost_flat: 100,
        read_cost_per_byte: 0,
        write_cost_flat: 200,
        write_cost_per_byte: 3,
        iter_next_cost_flat: 3,
    };
}

/// Tracks gas consumed against an optional limit.
///
/// An infinite meter (`limit == None`) still counts, so lifecycle hooks
/// report what they used.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GasMeter {
    limit: Option<u64>,
    consumed: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            consumed: 0,
        }
    }

    pub fn infinite() -> Self {
        Self::default()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Gas to report in a result: never more than the limit.
    pub fn consumed_to_limit(&self) -> u64 {
        match self.limit {
            Some(limit) => self.consumed.min(limit),
            None => self.consumed,
        }
    }

    pub fn remaining(&self) -> Option<u64> {
        self.limit.map(|l| l.saturating_sub(self.consumed))
    }

    pub fn is_out_of_gas(&self) -> bool {
        self.limit.is_some_and(|l| self.consumed > l)
    }

    /// Charge `amount`. Crossing the limit records the charge and fails.
    pub fn consume(&mut self, amount: u64, descriptor: &str) -> Result<(), ModuleError> {
        self.consumed = self.consumed.saturating_add(amount);
        match self.limit {
            Some(limit) if self.consumed > limit => Err(ModuleError::OutOfGas {
                descriptor: descriptor.to_string(),
                limit,
                used: self.consumed,
            }),
            _ => Ok(()),
        }
    }

    /// Used by nested contexts to hand their consumption back.
    pub(crate) fn set_consumed(&mut self, consumed: u64) {
        self.consumed = consumed;
    }
}
