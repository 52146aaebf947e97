//! # Genesis Flows
//!
//! Genesis decoding, validation and application across every module, and
//! agreement between independent instances.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use mc_04_auth::Account;
    use node_runtime::app::{AppPhase, ChainApp, InitChainRequest};
    use node_runtime::genesis::GenesisBuilder;
    use mc_01_store::InMemoryVersionedStore;
    use shared_types::{module_names, Address, FatalError, Permission};

    fn pool_permissions(chain: &TestChain, pool: &str) -> Vec<Permission> {
        let account: Account = chain
            .query_json(&format!("auth/module_account/{pool}"))
            .expect("pool account exists");
        let mut permissions = account.as_module().expect("module account").permissions.clone();
        permissions.sort();
        permissions
    }

    #[test]
    fn test_genesis_funds_account_and_creates_empty_pools() {
        let a = Actor::from_seed(10);
        let doc = GenesisBuilder::new(CHAIN_ID)
            .genesis_time(GENESIS_TIME)
            .account(a.address, coins("100stake"))
            .unwrap()
            .build()
            .unwrap();
        let mut chain = TestChain::new(&doc);
        assert!(chain.genesis_validators.is_empty());
        chain.next_block(&[]);

        assert_eq!(chain.balance(&a.address), 100);
        for pool in [module_names::BONDED_POOL, module_names::NOT_BONDED_POOL] {
            assert_eq!(chain.balance(&Address::module(pool)), 0);
            assert_eq!(
                pool_permissions(&chain, pool),
                vec![Permission::Burner, Permission::Staking]
            );
        }
        assert!(chain
            .account(&Address::module(module_names::FEE_COLLECTOR))
            .is_some());
    }

    #[test]
    fn test_gen_tx_bonds_validator_at_genesis() {
        let doc = genesis(&[]);
        let chain = TestChain::new(&doc);
        let validator = Actor::from_seed(1);
        assert_eq!(chain.genesis_validators.len(), 1);
        assert_eq!(chain.genesis_validators[0].pub_key, validator.pub_key);
        assert_eq!(chain.genesis_validators[0].power, 10);
    }

    #[test]
    fn test_two_instances_reach_identical_genesis_state() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let doc = genesis(&[(&a, "100stake"), (&b, "5stake")]);

        let mut first = TestChain::new(&doc);
        let mut second = TestChain::new(&doc);
        assert_eq!(first.genesis_validators, second.genesis_validators);

        let one = first.next_block(&[]);
        let two = second.next_block(&[]);
        assert_eq!(one.app_hash, two.app_hash);
        assert_eq!(
            first.app.export_app_state().unwrap(),
            second.app.export_app_state().unwrap()
        );
    }

    #[test]
    fn test_export_round_trips_balances() {
        let a = Actor::from_seed(10);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);
        let exported = chain.app.export_app_state().unwrap();
        assert_eq!(exported.height, 1);
        for section in ["capability", "auth", "bank", "staking", "genutil"] {
            assert!(exported.app_state.contains_key(section), "missing {section}");
        }
        let bank: mc_05_bank::BankGenesisState =
            serde_json::from_value(exported.app_state["bank"].clone()).unwrap();
        let a_balance = bank
            .balances
            .iter()
            .find(|b| b.address == a.address)
            .unwrap();
        assert_eq!(a_balance.coins.amount_of(DENOM), 100);
    }

    #[test]
    fn test_malformed_genesis_halts() {
        let mut app = ChainApp::new(test_config(), Box::new(InMemoryVersionedStore::new())).unwrap();
        app.load_latest_version().unwrap();
        let err = app
            .init_chain(InitChainRequest {
                chain_id: CHAIN_ID.into(),
                genesis_time: GENESIS_TIME,
                app_state_bytes: b"{not json".to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, FatalError::GenesisDecode(_)));
        assert!(matches!(app.phase(), AppPhase::Halted { .. }));
    }

    #[test]
    fn test_unknown_genesis_section_is_fatal() {
        let mut doc = genesis(&[]);
        doc.app_state
            .insert("governance".into(), serde_json::json!({}));
        let mut app = ChainApp::new(test_config(), Box::new(InMemoryVersionedStore::new())).unwrap();
        app.load_latest_version().unwrap();
        let err = app
            .init_chain(doc.to_init_chain_request().unwrap())
            .unwrap_err();
        assert!(matches!(err, FatalError::UnknownModule { .. }), "{err:?}");
        assert!(app.is_halted());
    }

    #[test]
    fn test_chain_id_mismatch_is_fatal() {
        let mut doc = genesis(&[]);
        doc.chain_id = "other-chain".into();
        let mut app = ChainApp::new(test_config(), Box::new(InMemoryVersionedStore::new())).unwrap();
        app.load_latest_version().unwrap();
        assert!(app.init_chain(doc.to_init_chain_request().unwrap()).is_err());
        assert!(app.is_halted());
    }

    #[test]
    fn test_init_chain_only_once() {
        let doc = genesis(&[]);
        let mut chain = TestChain::new(&doc);
        let err = chain
            .app
            .init_chain(doc.to_init_chain_request().unwrap())
            .unwrap_err();
        assert!(matches!(err, FatalError::UnexpectedCall { .. }));
        assert!(!chain.app.is_halted());
    }
}
