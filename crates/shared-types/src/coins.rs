//! # Coins
//!
//! Token amounts are `u128` base units. A [`Coins`] set is always sorted by
//! denomination, free of duplicates and free of zero amounts, so two equal
//! sets have identical encodings on every replica.
//!
//! Amounts are encoded as decimal strings in JSON so values above `u64::MAX`
//! survive generic JSON handling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced by coin arithmetic and parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoinsError {
    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    #[error("duplicate denom: {0}")]
    DuplicateDenom(String),

    #[error("coins are not sorted: {0} must come before {1}")]
    Unsorted(String, String),

    #[error("zero amount for denom {0}")]
    ZeroAmount(String),

    #[error("amount overflow for denom {0}")]
    Overflow(String),

    #[error("insufficient {denom}: have {available}, need {required}")]
    Insufficient {
        denom: String,
        available: u128,
        required: u128,
    },

    #[error("cannot parse coin: {0}")]
    Parse(String),
}

/// Check a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), CoinsError> {
    let bytes = denom.as_bytes();
    let valid_len = (3..=128).contains(&bytes.len());
    let valid_head = bytes.first().is_some_and(u8::is_ascii_alphabetic);
    let valid_tail = bytes
        .iter()
        .skip(1)
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'));
    if valid_len && valid_head && valid_tail {
        Ok(())
    } else {
        Err(CoinsError::InvalidDenom(denom.to_string()))
    }
}

/// A single denomination and amount.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "amount_string")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<(), CoinsError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinsError;

    /// Parse `"100stake"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoinsError::Parse(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        let amount: u128 = amount
            .parse()
            .map_err(|_| CoinsError::Parse(s.to_string()))?;
        validate_denom(denom)?;
        Ok(Coin::new(denom, amount))
    }
}

/// A sorted, duplicate-free set of non-zero coins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a validated set. Input must already be sorted and duplicate free.
    pub fn new(coins: Vec<Coin>) -> Result<Self, CoinsError> {
        for coin in &coins {
            coin.validate()?;
            if coin.amount == 0 {
                return Err(CoinsError::ZeroAmount(coin.denom.clone()));
            }
        }
        for pair in coins.windows(2) {
            if pair[0].denom == pair[1].denom {
                return Err(CoinsError::DuplicateDenom(pair[0].denom.clone()));
            }
            if pair[0].denom > pair[1].denom {
                return Err(CoinsError::Unsorted(
                    pair[1].denom.clone(),
                    pair[0].denom.clone(),
                ));
            }
        }
        Ok(Self(coins))
    }

    /// Build a set from arbitrary coins, sorting, merging duplicates and
    /// dropping zero amounts.
    pub fn normalize(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinsError> {
        let mut merged: BTreeMap<String, u128> = BTreeMap::new();
        for coin in coins {
            coin.validate()?;
            let entry = merged.entry(coin.denom.clone()).or_default();
            *entry = entry
                .checked_add(coin.amount)
                .ok_or(CoinsError::Overflow(coin.denom))?;
        }
        Ok(Self(
            merged
                .into_iter()
                .filter(|(_, amount)| *amount > 0)
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        ))
    }

    pub fn single(denom: impl Into<String>, amount: u128) -> Result<Self, CoinsError> {
        Self::normalize([Coin::new(denom, amount)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(0)
    }

    pub fn checked_add(&self, other: &Coins) -> Result<Coins, CoinsError> {
        Self::normalize(self.0.iter().chain(other.0.iter()).cloned())
    }

    /// Subtract `other`, failing if any denomination would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut remaining: BTreeMap<String, u128> = self
            .0
            .iter()
            .map(|c| (c.denom.clone(), c.amount))
            .collect();
        for coin in &other.0 {
            let available = remaining.get(&coin.denom).copied().unwrap_or(0);
            let left = available
                .checked_sub(coin.amount)
                .ok_or_else(|| CoinsError::Insufficient {
                    denom: coin.denom.clone(),
                    available,
                    required: coin.amount,
                })?;
            remaining.insert(coin.denom.clone(), left);
        }
        Self::normalize(remaining.into_iter().map(|(d, a)| Coin::new(d, a)))
    }

    /// True if every denomination in `other` is covered by `self`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinsError;

    fn try_from(value: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::new(value)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(value: Coins) -> Self {
        value.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(Coin::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

impl FromStr for Coins {
    type Err = CoinsError;

    /// Parse `"10atom,100stake"`; an empty string is the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Coins::empty());
        }
        let coins = s
            .split(',')
            .map(Coin::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Coins::normalize(coins)
    }
}

/// Serde adapter for `u128` amounts.
///
/// Human-readable formats (JSON) get a decimal string and accept either a
/// string or an integer on input; binary formats use the native `u128`.
pub mod amount_string {
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&value.to_string())
        } else {
            serializer.serialize_u128(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(u128::from(v))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.parse().map_err(E::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_any(AmountVisitor)
        } else {
            u128::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins(s: &str) -> Coins {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_sorts_and_merges() {
        let set = Coins::normalize(vec![
            Coin::new("stake", 5),
            Coin::new("atom", 1),
            Coin::new("stake", 7),
            Coin::new("zeta", 0),
        ])
        .unwrap();
        assert_eq!(set.to_string(), "1atom,12stake");
    }

    #[test]
    fn test_new_rejects_unsorted_and_zero() {
        assert!(matches!(
            Coins::new(vec![Coin::new("stake", 1), Coin::new("atom", 1)]),
            Err(CoinsError::Unsorted(..))
        ));
        assert!(matches!(
            Coins::new(vec![Coin::new("stake", 0)]),
            Err(CoinsError::ZeroAmount(_))
        ));
    }

    #[test]
    fn test_checked_sub_is_all_or_nothing() {
        let have = coins("10atom,100stake");
        assert_eq!(have.checked_sub(&coins("30stake")).unwrap(), coins("10atom,70stake"));
        let err = have.checked_sub(&coins("11atom,1stake")).unwrap_err();
        assert!(matches!(err, CoinsError::Insufficient { ref denom, .. } if denom == "atom"));
    }

    #[test]
    fn test_is_all_gte() {
        let have = coins("10atom,100stake");
        assert!(have.is_all_gte(&coins("100stake")));
        assert!(!have.is_all_gte(&coins("1btc")));
        assert!(have.is_all_gte(&Coins::empty()));
    }

    #[test]
    fn test_invalid_denoms() {
        assert!(validate_denom("1abc").is_err());
        assert!(validate_denom("ab").is_err());
        assert!(validate_denom("ibc/ABC-1").is_ok());
    }

    #[test]
    fn test_json_amount_is_string_and_accepts_numbers() {
        let json = serde_json::to_string(&coins("100stake")).unwrap();
        assert_eq!(json, r#"[{"denom":"stake","amount":"100"}]"#);
        let parsed: Coins = serde_json::from_str(r#"[{"denom":"stake","amount":100}]"#).unwrap();
        assert_eq!(parsed, coins("100stake"));
    }

    #[test]
    fn test_deserialize_rejects_unsorted() {
        let raw = r#"[{"denom":"stake","amount":"1"},{"denom":"atom","amount":"1"}]"#;
        assert!(serde_json::from_str::<Coins>(raw).is_err());
    }

    #[test]
    fn test_bincode_roundtrip_is_stable() {
        let set = coins("3atom,9stake");
        let bytes = bincode::serialize(&set).unwrap();
        assert_eq!(bincode::serialize(&set).unwrap(), bytes);
        let back: Coins = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, set);
    }
}
