use crate::{
    AccountKeeper, AnteDecorator, AnteError, AnteTx, BankKeeper, ConsumeTxSizeDecorator,
    DeductFeeDecorator, FeePolicy, IncrementSequenceDecorator, MempoolFeeDecorator,
    SetPubKeyDecorator, SigGasConsumeDecorator, SigVerificationDecorator, TxTimeoutHeightDecorator,
    ValidateBasicDecorator, ValidateMemoDecorator, ValidateSigCountDecorator,
};
use mc_02_module::{Context, MsgValidator, Tx};
use shared_types::{Address, FatalError};
use std::sync::Arc;
use tracing::debug;

/// Dependencies of the admission chain. Every keeper is required.
#[derive(Default)]
pub struct HandlerOptions {
    pub account_keeper: Option<Arc<dyn AccountKeeper>>,
    pub bank_keeper: Option<Arc<dyn BankKeeper>>,
    pub msg_validator: Option<Arc<dyn MsgValidator>>,
    pub fee_policy: FeePolicy,
}

/// What admission established about an accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admitted {
    pub signers: Vec<Address>,
    pub fee_payer: Address,
}

pub struct AnteHandler {
    decorators: Vec<Box<dyn AnteDecorator>>,
    msg_validator: Arc<dyn MsgValidator>,
}

impl AnteHandler {
    /// Build the standard chain. A missing dependency is a start-up error.
    pub fn new(options: HandlerOptions) -> Result<Self, FatalError> {
        let missing = |what: &str| FatalError::Config(format!("{what} is required for the ante handler"));
        let accounts = options.account_keeper.ok_or_else(|| missing("account keeper"))?;
        let bank = options.bank_keeper.ok_or_else(|| missing("bank keeper"))?;
        let msg_validator = options.msg_validator.ok_or_else(|| missing("message router"))?;

        let decorators: Vec<Box<dyn AnteDecorator>> = vec![
            Box::new(ValidateBasicDecorator),
            Box::new(TxTimeoutHeightDecorator),
            Box::new(ValidateMemoDecorator::new(accounts.clone())),
            Box::new(ConsumeTxSizeDecorator::new(accounts.clone())),
            Box::new(SetPubKeyDecorator::new(accounts.clone())),
            Box::new(ValidateSigCountDecorator::new(accounts.clone())),
            Box::new(SigGasConsumeDecorator::new(accounts.clone())),
            Box::new(SigVerificationDecorator::new(accounts.clone())),
            Box::new(MempoolFeeDecorator::new(options.fee_policy)),
            Box::new(DeductFeeDecorator::new(bank)),
            Box::new(IncrementSequenceDecorator::new(accounts)),
        ];
        Ok(Self {
            decorators,
            msg_validator,
        })
    }

    pub fn decorator_names(&self) -> Vec<&'static str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }

    /// Run the chain on a branch of `ctx`.
    ///
    /// Writes and events are kept only if every decorator passes. Gas used
    /// up to a failure stays charged on `ctx`.
    pub fn run(&self, ctx: &mut Context<'_>, tx: &Tx, size: u64) -> Result<Admitted, AnteError> {
        let ante_tx = AnteTx::new(tx.clone(), size, self.msg_validator.as_ref())?;
        ctx.branch(|ctx| {
            for decorator in &self.decorators {
                if let Err(err) = decorator.ante(ctx, &ante_tx) {
                    debug!(decorator = decorator.name(), error = %err, "[Ante] transaction rejected");
                    return Err(err);
                }
            }
            Ok(())
        })?;
        let fee_payer = ante_tx.fee_payer().ok_or(AnteError::NoSignatures)?;
        Ok(Admitted {
            signers: ante_tx.signers,
            fee_payer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SignerAccount, DEFAULT_BYPASS_MIN_FEE_MSG_TYPES};
    use ed25519_dalek::SigningKey;
    use mc_01_store::{InMemoryVersionedStore, MultiStore, PartitionManager, StoreKind};
    use mc_02_module::{
        BlockHeader, ExecMode, GasMeter, ModuleError, Msg, SignerData, TxBuilder,
    };
    use mc_04_auth::AuthParams;
    use parking_lot::Mutex;
    use shared_types::{codes, Coins, PublicKey, TxError};
    use std::collections::BTreeMap;

    const PING: &str = "/test.Ping";
    const CHAIN: &str = "modular-1";

    #[derive(Default)]
    struct MockAccounts {
        params: AuthParams,
        accounts: Mutex<BTreeMap<Address, SignerAccount>>,
    }

    impl MockAccounts {
        fn add(&self, address: Address, account_number: u64, is_module: bool) {
            self.accounts.lock().insert(
                address,
                SignerAccount {
                    address,
                    account_number,
                    sequence: 0,
                    pub_key: None,
                    is_module,
                },
            );
        }

        fn sequence(&self, address: &Address) -> u64 {
            self.accounts.lock()[address].sequence
        }
    }

    impl AccountKeeper for MockAccounts {
        fn params(&self, _ctx: &mut Context<'_>) -> Result<AuthParams, ModuleError> {
            Ok(self.params)
        }

        fn signer_account(
            &self,
            _ctx: &mut Context<'_>,
            address: &Address,
        ) -> Result<Option<SignerAccount>, ModuleError> {
            Ok(self.accounts.lock().get(address).cloned())
        }

        fn set_pub_key(
            &self,
            _ctx: &mut Context<'_>,
            address: &Address,
            pub_key: PublicKey,
        ) -> Result<(), ModuleError> {
            if let Some(account) = self.accounts.lock().get_mut(address) {
                account.pub_key = Some(pub_key);
            }
            Ok(())
        }

        fn increment_sequence(&self, _ctx: &mut Context<'_>, address: &Address) -> Result<u64, ModuleError> {
            let mut accounts = self.accounts.lock();
            let account = accounts
                .get_mut(address)
                .ok_or_else(|| ModuleError::Rejected(TxError::unknown_address("missing")))?;
            account.sequence += 1;
            Ok(account.sequence)
        }
    }

    #[derive(Default)]
    struct MockBank {
        balances: Mutex<BTreeMap<Address, u128>>,
        collected: Mutex<u128>,
    }

    impl BankKeeper for MockBank {
        fn send_coins_from_account_to_module(
            &self,
            _ctx: &mut Context<'_>,
            from: &Address,
            _module: &str,
            coins: &Coins,
        ) -> Result<(), ModuleError> {
            let amount = coins.amount_of("stake");
            let mut balances = self.balances.lock();
            let balance = balances.entry(*from).or_default();
            if *balance < amount {
                return Err(ModuleError::Rejected(TxError::insufficient_funds("fee")));
            }
            *balance -= amount;
            *self.collected.lock() += amount;
            Ok(())
        }
    }

    /// Ping messages are signed by the address in their payload.
    struct PingRouter;

    impl MsgValidator for PingRouter {
        fn validate_msg(&self, msg: &Msg) -> Result<Vec<Address>, TxError> {
            if msg.type_url != PING && !DEFAULT_BYPASS_MIN_FEE_MSG_TYPES.contains(&msg.type_url.as_str()) {
                return Err(TxError::unknown_request(msg.type_url.clone()));
            }
            Ok(vec![msg.decode::<Address>()?])
        }
    }

    struct Fixture {
        accounts: Arc<MockAccounts>,
        bank: Arc<MockBank>,
        handler: AnteHandler,
        key: SigningKey,
        store: MultiStore,
    }

    impl Fixture {
        fn new(min_gas_prices: &str) -> Self {
            let accounts = Arc::new(MockAccounts::default());
            let bank = Arc::new(MockBank::default());
            let handler = AnteHandler::new(HandlerOptions {
                account_keeper: Some(accounts.clone()),
                bank_keeper: Some(bank.clone()),
                msg_validator: Some(Arc::new(PingRouter)),
                fee_policy: FeePolicy {
                    min_gas_prices: min_gas_prices.parse().unwrap(),
                    ..FeePolicy::default()
                },
            })
            .unwrap();
            let key = SigningKey::from_bytes(&[7; 32]);
            let address = Address::from_pubkey(&PublicKey(key.verifying_key().to_bytes()));
            accounts.add(address, 3, false);
            bank.balances.lock().insert(address, 1_000);

            let mut pm = PartitionManager::new();
            pm.allocate_one(StoreKind::Persistent, "acc").unwrap();
            let store = MultiStore::new(Box::new(InMemoryVersionedStore::new()), pm.seal()).unwrap();
            Self {
                accounts,
                bank,
                handler,
                key,
                store,
            }
        }

        fn address(&self) -> Address {
            Address::from_pubkey(&PublicKey(self.key.verifying_key().to_bytes()))
        }

        fn tx(&self, builder: TxBuilder, account_number: u64, sequence: u64) -> Tx {
            builder.sign(
                CHAIN,
                &[SignerData {
                    key: &self.key,
                    account_number,
                    sequence,
                }],
            )
        }

        fn ping(&self, fee: u128) -> TxBuilder {
            TxBuilder::new()
                .msg(Msg::new(PING, &self.address()).unwrap())
                .fee(Coins::single("stake", fee).unwrap(), 100_000)
        }

        fn run(&mut self, mode: ExecMode, tx: &Tx) -> Result<Admitted, AnteError> {
            let header = BlockHeader {
                chain_id: CHAIN.into(),
                height: 5,
                ..BlockHeader::default()
            };
            let mut ctx = Context::new(&mut self.store, header, mode).with_gas_meter(GasMeter::new(
                tx.auth_info.fee.gas_limit,
            ));
            self.handler.run(&mut ctx, tx, tx.encode().len() as u64)
        }
    }

    fn code(err: AnteError) -> u32 {
        TxError::from(err).code
    }

    #[test]
    fn test_chain_order() {
        let fx = Fixture::new("0stake");
        assert_eq!(
            fx.handler.decorator_names(),
            vec![
                "ValidateBasic",
                "TxTimeoutHeight",
                "ValidateMemo",
                "ConsumeTxSize",
                "SetPubKey",
                "ValidateSigCount",
                "SigGasConsume",
                "SigVerification",
                "MempoolFee",
                "DeductFee",
                "IncrementSequence",
            ]
        );
    }

    #[test]
    fn test_missing_keeper_is_fatal_config() {
        let result = AnteHandler::new(HandlerOptions::default());
        assert!(matches!(result, Err(FatalError::Config(_))));
    }

    #[test]
    fn test_valid_tx_deducts_fee_and_bumps_sequence() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(10), 3, 0);
        let admitted = fx.run(ExecMode::Deliver, &tx).unwrap();
        assert_eq!(admitted.fee_payer, fx.address());
        assert_eq!(fx.accounts.sequence(&fx.address()), 1);
        assert_eq!(*fx.bank.collected.lock(), 10);
    }

    #[test]
    fn test_replayed_sequence_is_rejected() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(10), 3, 0);
        fx.run(ExecMode::Deliver, &tx).unwrap();
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert_eq!(code(err), codes::WRONG_SEQUENCE);
        assert_eq!(*fx.bank.collected.lock(), 10);
    }

    #[test]
    fn test_wrong_account_number_fails_signature() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(10), 9, 0);
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert!(matches!(err, AnteError::InvalidSignature(_)));
        assert_eq!(fx.accounts.sequence(&fx.address()), 0);
    }

    #[test]
    fn test_simulate_skips_signature_check() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(10), 9, 0);
        assert!(fx.run(ExecMode::Simulate, &tx).is_ok());
    }

    #[test]
    fn test_memo_limit_short_circuits_before_fee() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(10).memo("x".repeat(257)), 3, 0);
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert_eq!(code(err), codes::MEMO_TOO_LARGE);
        assert_eq!(*fx.bank.collected.lock(), 0);
    }

    #[test]
    fn test_timeout_height() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(10).timeout_height(4), 3, 0);
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert_eq!(code(err), codes::TX_TIMEOUT_HEIGHT);
    }

    #[test]
    fn test_min_fee_applies_to_check_only() {
        let mut fx = Fixture::new("0.01stake");
        // 100_000 gas at 0.01 requires 1000stake.
        let tx = fx.tx(fx.ping(999), 3, 0);
        let err = fx.run(ExecMode::Check, &tx).unwrap_err();
        assert_eq!(code(err), codes::INSUFFICIENT_FEE);
        assert!(fx.run(ExecMode::Deliver, &tx).is_ok());
    }

    #[test]
    fn test_allow_listed_messages_bypass_min_fee() {
        let mut fx = Fixture::new("1stake");
        let builder = TxBuilder::new()
            .msg(Msg::new(DEFAULT_BYPASS_MIN_FEE_MSG_TYPES[0], &fx.address()).unwrap())
            .fee(Coins::empty(), 100_000);
        let tx = fx.tx(builder, 3, 0);
        assert!(fx.run(ExecMode::Check, &tx).is_ok());
    }

    #[test]
    fn test_insufficient_balance_for_fee() {
        let mut fx = Fixture::new("0stake");
        let tx = fx.tx(fx.ping(5_000), 3, 0);
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert_eq!(code(err), codes::INSUFFICIENT_FUNDS);
        assert_eq!(fx.accounts.sequence(&fx.address()), 0);
    }

    #[test]
    fn test_module_account_cannot_sign() {
        let mut fx = Fixture::new("0stake");
        let address = fx.address();
        fx.accounts.add(address, 3, true);
        let tx = fx.tx(fx.ping(10), 3, 0);
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert!(matches!(err, AnteError::ModuleAccountSigner(_)));
    }

    #[test]
    fn test_unsigned_tx_is_rejected() {
        let mut fx = Fixture::new("0stake");
        let mut tx = fx.tx(fx.ping(10), 3, 0);
        tx.signatures.clear();
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert_eq!(code(err), codes::NO_SIGNATURES);
    }

    #[test]
    fn test_out_of_gas_on_tx_size() {
        let mut fx = Fixture::new("0stake");
        let builder = fx.ping(10).fee(Coins::single("stake", 10).unwrap(), 50);
        let tx = fx.tx(builder, 3, 0);
        let err = fx.run(ExecMode::Deliver, &tx).unwrap_err();
        assert_eq!(code(err), codes::OUT_OF_GAS);
    }
}
