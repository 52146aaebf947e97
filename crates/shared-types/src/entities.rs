//! # Core Domain Entities
//!
//! Identity and consensus-facing types.
//!
//! ## Address Derivation
//!
//! - Account address: first 20 bytes of `sha256(ed25519 public key)`
//! - Module account address: first 20 bytes of `sha256(module name)`
//!
//! Both encode as lowercase hex in JSON and in the binary codec.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash (state roots, transaction hashes).
pub type Hash = [u8; 32];

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Derive the address owned by an ed25519 public key.
    pub fn from_pubkey(pub_key: &PublicKey) -> Self {
        Self::truncated_sha256(&pub_key.0)
    }

    /// Derive the deterministic address of a module account.
    pub fn module(name: &str) -> Self {
        Self::truncated_sha256(name.as_bytes())
    }

    fn truncated_sha256(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 32-byte ed25519 public key (account keys and consensus keys).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PublicKey(pub [u8; 32]);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&s, &mut out).map_err(serde::de::Error::custom)?;
        Ok(Self(out))
    }
}

/// Restricted capabilities a module account may hold.
///
/// Attached through the module-account permission table in the
/// application configuration; a module without an entry cannot own an
/// account at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// May create new supply.
    Minter,
    /// May destroy supply it holds.
    Burner,
    /// May hold delegated (bonded / unbonding) tokens.
    Staking,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minter => "minter",
            Self::Burner => "burner",
            Self::Staking => "staking",
        };
        f.write_str(s)
    }
}

/// Module name to the permissions its module account holds.
///
/// A module missing from the table cannot own a module account.
pub type ModuleAccountPermissions = BTreeMap<String, BTreeSet<Permission>>;

/// A change to the consensus validator set.
///
/// `power == 0` removes the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: PublicKey,
    pub power: u64,
}

/// Well-known module names shared by configuration and wiring.
pub mod module_names {
    pub const AUTH: &str = "auth";
    pub const BANK: &str = "bank";
    pub const STAKING: &str = "staking";
    pub const PARAMS: &str = "params";
    pub const CAPABILITY: &str = "capability";
    pub const GENUTIL: &str = "genutil";

    /// Module account collecting transaction fees.
    pub const FEE_COLLECTOR: &str = "fee_collector";
    /// Module account holding bonded stake.
    pub const BONDED_POOL: &str = "bonded_tokens_pool";
    /// Module account holding unbonded and unbonding stake.
    pub const NOT_BONDED_POOL: &str = "not_bonded_tokens_pool";
}
