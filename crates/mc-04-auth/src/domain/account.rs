use serde::{Deserialize, Serialize};
use shared_types::{Address, Permission, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAccount {
    pub address: Address,
    #[serde(default)]
    pub pub_key: Option<PublicKey>,
    pub account_number: u64,
    #[serde(default)]
    pub sequence: u64,
}

impl BaseAccount {
    pub fn new(address: Address, account_number: u64) -> Self {
        Self {
            address,
            pub_key: None,
            account_number,
            sequence: 0,
        }
    }
}

/// An account owned by a module rather than a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccount {
    pub base: BaseAccount,
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl ModuleAccount {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Account {
    Base(BaseAccount),
    Module(ModuleAccount),
}

impl Account {
    pub fn base(&self) -> &BaseAccount {
        match self {
            Self::Base(b) => b,
            Self::Module(m) => &m.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseAccount {
        match self {
            Self::Base(b) => b,
            Self::Module(m) => &mut m.base,
        }
    }

    pub fn address(&self) -> Address {
        self.base().address
    }

    pub fn account_number(&self) -> u64 {
        self.base().account_number
    }

    pub fn sequence(&self) -> u64 {
        self.base().sequence
    }

    pub fn pub_key(&self) -> Option<PublicKey> {
        self.base().pub_key
    }

    pub fn as_module(&self) -> Option<&ModuleAccount> {
        match self {
            Self::Module(m) => Some(m),
            Self::Base(_) => None,
        }
    }
}
