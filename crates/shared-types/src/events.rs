//! # Events
//!
//! Typed key/value events emitted by keepers and returned with each
//! transaction result. Attribute order is insertion order and is part of the
//! deterministic output.

use serde::{Deserialize, Serialize};

/// A single event attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// An event emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder: append an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// First value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Event kinds and attribute keys emitted by the built-in modules.
pub mod event_types {
    pub const TRANSFER: &str = "transfer";
    pub const COIN_SPENT: &str = "coin_spent";
    pub const COIN_RECEIVED: &str = "coin_received";
    pub const MINT: &str = "mint";
    pub const BURN: &str = "burn";
    pub const MESSAGE: &str = "message";
    pub const TX: &str = "tx";
    pub const CREATE_VALIDATOR: &str = "create_validator";
    pub const DELEGATE: &str = "delegate";
    pub const UNBOND: &str = "unbond";
    pub const COMPLETE_UNBONDING: &str = "complete_unbonding";

    pub const ATTR_SENDER: &str = "sender";
    pub const ATTR_RECIPIENT: &str = "recipient";
    pub const ATTR_SPENDER: &str = "spender";
    pub const ATTR_RECEIVER: &str = "receiver";
    pub const ATTR_AMOUNT: &str = "amount";
    pub const ATTR_MINTER: &str = "minter";
    pub const ATTR_BURNER: &str = "burner";
    pub const ATTR_ACTION: &str = "action";
    pub const ATTR_MODULE: &str = "module";
    pub const ATTR_FEE: &str = "fee";
    pub const ATTR_FEE_PAYER: &str = "fee_payer";
    pub const ATTR_ACC_SEQ: &str = "acc_seq";
    pub const ATTR_VALIDATOR: &str = "validator";
    pub const ATTR_DELEGATOR: &str = "delegator";
    pub const ATTR_COMPLETION_TIME: &str = "completion_time";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder_keeps_order() {
        let event = Event::new(event_types::TRANSFER)
            .attr(event_types::ATTR_SENDER, "a")
            .attr(event_types::ATTR_RECIPIENT, "b")
            .attr(event_types::ATTR_AMOUNT, "30stake");
        let keys: Vec<_> = event.attributes.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["sender", "recipient", "amount"]);
        assert_eq!(event.get("amount"), Some("30stake"));
        assert_eq!(event.get("missing"), None);
    }
}
