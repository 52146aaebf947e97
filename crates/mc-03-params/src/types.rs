use serde::{Deserialize, Serialize};
use shared_types::amount_string;
use std::collections::BTreeMap;
use std::fmt;

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Bool(bool),
    Count(u64),
    Quantity(#[serde(with = "amount_string")] u128),
    /// Seconds.
    Duration(u64),
    /// Hundredths of a percent, at most 10 000.
    BasisPoints(u16),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Count,
    Quantity,
    Duration,
    BasisPoints,
    Text,
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Bool,
            Self::Count(_) => ParamKind::Count,
            Self::Quantity(_) => ParamKind::Quantity,
            Self::Duration(_) => ParamKind::Duration,
            Self::BasisPoints(_) => ParamKind::BasisPoints,
            Self::Text(_) => ParamKind::Text,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Count => "count",
            Self::Quantity => "quantity",
            Self::Duration => "duration",
            Self::BasisPoints => "basis_points",
            Self::Text => "text",
        };
        f.write_str(s)
    }
}

/// Extra validation applied after the kind check.
pub type Validator = fn(&ParamValue) -> Result<(), String>;

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub validator: Validator,
}

impl ParamSpec {
    pub fn validate(&self, value: &ParamValue) -> Result<(), String> {
        if value.kind() != self.kind {
            return Err(format!("expected {}, got {}", self.kind, value.kind()));
        }
        if let ParamValue::BasisPoints(bp) = value {
            if *bp > 10_000 {
                return Err(format!("basis points {bp} exceed 10000"));
            }
        }
        (self.validator)(value)
    }
}

/// The closed set of keys of one subspace.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    specs: BTreeMap<&'static str, ParamSpec>,
}

impl KeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`. Registering a key twice keeps the last rule.
    #[must_use]
    pub fn register(mut self, key: &'static str, kind: ParamKind, validator: Validator) -> Self {
        self.specs.insert(key, ParamSpec { kind, validator });
        self
    }

    pub fn spec(&self, key: &str) -> Option<&ParamSpec> {
        self.specs.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Accept any value of the right kind.
pub fn any_value(_: &ParamValue) -> Result<(), String> {
    Ok(())
}

/// Reject zero counts, quantities and durations.
pub fn positive(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Count(0) | ParamValue::Quantity(0) | ParamValue::Duration(0) => {
            Err("must be positive".to_string())
        }
        _ => Ok(()),
    }
}

/// Reject empty text.
pub fn non_empty_text(value: &ParamValue) -> Result<(), String> {
    match value {
        ParamValue::Text(s) if s.trim().is_empty() => Err("must not be empty".to_string()),
        _ => Ok(()),
    }
}

/// Who is asking to change a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// The module with this name.
    Module(String),
    Governance,
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(name) => write!(f, "module:{name}"),
            Self::Governance => f.write_str("governance"),
        }
    }
}
