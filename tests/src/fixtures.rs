//! Shared harness for driving a [`ChainApp`] block by block.
//!
//! Fixtures panic on unexpected errors; they are only used by tests and
//! benchmarks.

use ed25519_dalek::SigningKey;
use mc_01_store::InMemoryVersionedStore;
use mc_02_module::{BlockHeader, Msg, TxBuilder, SignerData};
use mc_04_auth::Account;
use mc_05_bank::{MsgSend, MSG_SEND_TYPE_URL};
use node_runtime::app::{
    BeginBlockRequest, ChainApp, CheckTxKind, EndBlockRequest, QueryRequest, TxResult,
};
use node_runtime::container::AppConfig;
use node_runtime::genesis::{GenesisBuilder, GenesisDoc};
use shared_types::{Address, Coin, Coins, Event, Hash, PublicKey, ValidatorUpdate};

pub const CHAIN_ID: &str = "test-chain";
pub const DENOM: &str = "stake";
pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const BLOCK_INTERVAL: u64 = 5;
pub const GAS_LIMIT: u64 = 200_000;
/// Self bond of the genesis validator: power 10.
pub const VALIDATOR_BOND: u128 = 10_000_000;

/// A key pair and the account address it controls.
pub struct Actor {
    pub key: SigningKey,
    pub address: Address,
    pub pub_key: PublicKey,
}

impl Actor {
    pub fn from_seed(seed: u8) -> Self {
        let key = SigningKey::from_bytes(&[seed; 32]);
        let pub_key = PublicKey(key.verifying_key().to_bytes());
        Self {
            address: Address::from_pubkey(&pub_key),
            pub_key,
            key,
        }
    }
}

pub fn coins(s: &str) -> Coins {
    s.parse().expect("coins literal")
}

pub fn send_msg(from: Address, to: Address, amount: &str) -> Msg {
    Msg::new(
        MSG_SEND_TYPE_URL,
        &MsgSend {
            from_address: from,
            to_address: to,
            amount: coins(amount),
        },
    )
    .expect("encode MsgSend")
}

/// One validator (seed 1) plus `funded` accounts with the given balances.
pub fn genesis(funded: &[(&Actor, &str)]) -> GenesisDoc {
    genesis_builder(funded).build().expect("build genesis")
}

pub fn genesis_builder(funded: &[(&Actor, &str)]) -> GenesisBuilder {
    let validator = Actor::from_seed(1);
    let mut builder = GenesisBuilder::new(CHAIN_ID)
        .genesis_time(GENESIS_TIME)
        .validator(validator.key, "validator-0", VALIDATOR_BOND);
    for (actor, amount) in funded {
        builder = builder.account(actor.address, coins(amount)).expect("fund account");
    }
    builder
}

pub fn test_config() -> AppConfig {
    AppConfig {
        chain_id: CHAIN_ID.to_string(),
        ..AppConfig::default()
    }
}

/// Everything a committed block produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub height: u64,
    pub results: Vec<TxResult>,
    pub validator_updates: Vec<ValidatorUpdate>,
    pub end_block_events: Vec<Event>,
    pub app_hash: Hash,
}

pub struct TestChain {
    pub app: ChainApp,
    pub genesis_validators: Vec<ValidatorUpdate>,
}

impl TestChain {
    pub fn new(doc: &GenesisDoc) -> Self {
        Self::with_config(test_config(), doc)
    }

    pub fn with_config(config: AppConfig, doc: &GenesisDoc) -> Self {
        let mut app = ChainApp::new(config, Box::new(InMemoryVersionedStore::new()))
            .expect("assemble app");
        app.load_latest_version().expect("load version");
        let res = app
            .init_chain(doc.to_init_chain_request().expect("encode genesis"))
            .expect("init chain");
        Self {
            app,
            genesis_validators: res.validators,
        }
    }

    pub fn height(&self) -> u64 {
        self.app.last_block_height()
    }

    pub fn next_header(&self) -> BlockHeader {
        let height = self.height() + 1;
        BlockHeader {
            chain_id: CHAIN_ID.to_string(),
            height,
            time: GENESIS_TIME + height * BLOCK_INTERVAL,
            proposer: Actor::from_seed(1).address,
        }
    }

    /// Begin, deliver every transaction, end and commit one block.
    pub fn next_block(&mut self, txs: &[Vec<u8>]) -> BlockOutcome {
        let header = self.next_header();
        let height = header.height;
        self.app
            .begin_block(BeginBlockRequest { header })
            .expect("begin block");
        let results = txs
            .iter()
            .map(|tx| self.app.deliver_tx(tx).expect("deliver tx"))
            .collect();
        let end = self
            .app
            .end_block(EndBlockRequest { height })
            .expect("end block");
        let commit = self.app.commit().expect("commit");
        BlockOutcome {
            height,
            results,
            validator_updates: end.validator_updates,
            end_block_events: end.events,
            app_hash: commit.app_hash,
        }
    }

    pub fn check(&mut self, tx: &[u8]) -> TxResult {
        self.app.check_tx(tx, CheckTxKind::New).expect("check tx")
    }

    pub fn query_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Option<T> {
        let res = self.app.query(&QueryRequest::latest(path));
        if !res.is_ok() {
            return None;
        }
        Some(serde_json::from_slice(&res.value).expect("query json"))
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.query_json(&format!("auth/account/{address}"))
    }

    pub fn balance(&self, address: &Address) -> u128 {
        let coin: Coin = self
            .query_json(&format!("bank/balance/{address}/{DENOM}"))
            .expect("balance query");
        coin.amount
    }

    /// Sign `msgs` by `actor` at its committed account number and sequence.
    pub fn sign(&self, actor: &Actor, msgs: Vec<Msg>, fee: &str) -> Vec<u8> {
        let account = self.account(&actor.address).expect("signer account exists");
        sign_with(actor, account.account_number(), account.sequence(), msgs, fee)
    }
}

pub fn sign_with(
    actor: &Actor,
    account_number: u64,
    sequence: u64,
    msgs: Vec<Msg>,
    fee: &str,
) -> Vec<u8> {
    let mut builder = TxBuilder::new().fee(coins(fee), GAS_LIMIT);
    for msg in msgs {
        builder = builder.msg(msg);
    }
    builder
        .sign(
            CHAIN_ID,
            &[SignerData {
                key: &actor.key,
                account_number,
                sequence,
            }],
        )
        .encode()
}
