//! # Validator Set Flows
//!
//! Staking messages delivered through the full pipeline and the
//! validator-set delta reported at end-block.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use mc_02_module::Msg;
    use mc_06_staking::{
        MsgCreateValidator, MsgDelegate, MsgUndelegate, Validator, MSG_CREATE_VALIDATOR_TYPE_URL,
        MSG_DELEGATE_TYPE_URL, MSG_UNDELEGATE_TYPE_URL,
    };
    use node_runtime::genesis::GenesisDoc;
    use serde_json::{json, Value};
    use shared_types::{event_types, Coin, ValidatorUpdate};

    fn bond(amount: u128) -> Coin {
        Coin::new(DENOM, amount)
    }

    fn set_staking_param(doc: &mut GenesisDoc, key: &str, value: Value) {
        doc.app_state
            .get_mut("staking")
            .and_then(|s| s.get_mut("params"))
            .and_then(Value::as_object_mut)
            .unwrap()
            .insert(key.to_string(), value);
    }

    fn create_validator(actor: &Actor, moniker: &str, amount: u128) -> Msg {
        Msg::new(
            MSG_CREATE_VALIDATOR_TYPE_URL,
            &MsgCreateValidator {
                operator: actor.address,
                pub_key: actor.pub_key,
                moniker: moniker.to_string(),
                value: bond(amount),
            },
        )
        .unwrap()
    }

    /// Max one validator; `challenger` is funded and outbids the genesis
    /// validator in block 2.
    fn rotation_chain() -> (TestChain, Vec<BlockOutcome>) {
        let challenger = Actor::from_seed(20);
        let mut doc = genesis(&[(&challenger, "50000000stake")]);
        set_staking_param(&mut doc, "max_validators", json!(1));
        let mut chain = TestChain::new(&doc);

        let first = chain.next_block(&[]);
        let tx = chain.sign(
            &challenger,
            vec![create_validator(&challenger, "challenger", 20_000_000)],
            "",
        );
        let second = chain.next_block(&[tx]);
        (chain, vec![first, second])
    }

    #[test]
    fn test_genesis_validator_reported_at_init() {
        let chain = TestChain::new(&genesis(&[]));
        let validator = Actor::from_seed(1);
        assert_eq!(
            chain.genesis_validators,
            vec![ValidatorUpdate {
                pub_key: validator.pub_key,
                power: 10
            }]
        );
    }

    #[test]
    fn test_stronger_validator_rotates_out_weaker() {
        let (chain, blocks) = rotation_chain();
        let challenger = Actor::from_seed(20);
        let incumbent = Actor::from_seed(1);

        assert!(blocks[0].validator_updates.is_empty());
        let result = &blocks[1].results[0];
        assert!(result.is_ok(), "{}", result.log);
        assert_eq!(
            blocks[1].validator_updates,
            vec![
                ValidatorUpdate {
                    pub_key: challenger.pub_key,
                    power: 20
                },
                ValidatorUpdate {
                    pub_key: incumbent.pub_key,
                    power: 0
                },
            ]
        );

        let old: Validator = chain
            .query_json(&format!("staking/validator/{}", incumbent.address))
            .unwrap();
        assert!(!old.is_bonded());
        assert_eq!(old.tokens, VALIDATOR_BOND);

        let pool: Value = chain.query_json("staking/pool").unwrap();
        assert_eq!(pool["bonded_tokens"], "20000000");
        assert_eq!(pool["not_bonded_tokens"], "10000000");
        assert_eq!(chain.balance(&challenger.address), 30_000_000);
    }

    #[test]
    fn test_rotation_reproduces_on_second_instance() {
        let (first_chain, first) = rotation_chain();
        let (second_chain, second) = rotation_chain();
        assert_eq!(first, second);
        assert_eq!(
            first_chain.app.export_app_state().unwrap(),
            second_chain.app.export_app_state().unwrap()
        );
    }

    #[test]
    fn test_unchanged_set_reports_no_updates() {
        let mut chain = TestChain::new(&genesis(&[]));
        for _ in 0..3 {
            assert!(chain.next_block(&[]).validator_updates.is_empty());
        }
    }

    #[test]
    fn test_delegate_then_undelegate_releases_after_unbonding_time() {
        let delegator = Actor::from_seed(30);
        let validator = Actor::from_seed(1);
        let mut doc = genesis(&[(&delegator, "5000000stake")]);
        set_staking_param(&mut doc, "unbonding_time", json!(10));
        let mut chain = TestChain::new(&doc);
        chain.next_block(&[]);

        let delegate = Msg::new(
            MSG_DELEGATE_TYPE_URL,
            &MsgDelegate {
                delegator: delegator.address,
                validator: validator.address,
                amount: bond(3_000_000),
            },
        )
        .unwrap();
        let tx = chain.sign(&delegator, vec![delegate], "");
        let block = chain.next_block(&[tx]);
        assert!(block.results[0].is_ok(), "{}", block.results[0].log);
        assert_eq!(
            block.validator_updates,
            vec![ValidatorUpdate {
                pub_key: validator.pub_key,
                power: 13
            }]
        );
        assert_eq!(chain.balance(&delegator.address), 2_000_000);

        let undelegate = Msg::new(
            MSG_UNDELEGATE_TYPE_URL,
            &MsgUndelegate {
                delegator: delegator.address,
                validator: validator.address,
                amount: bond(3_000_000),
            },
        )
        .unwrap();
        let tx = chain.sign(&delegator, vec![undelegate], "");
        let block = chain.next_block(&[tx]);
        assert!(block.results[0].is_ok(), "{}", block.results[0].log);
        assert_eq!(block.validator_updates[0].power, 10);

        let pending: Vec<Value> = chain.query_json("staking/unbonding").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(chain.balance(&delegator.address), 2_000_000);

        // Released once block time passes the completion time (10s, two blocks).
        let block = chain.next_block(&[]);
        assert!(block
            .end_block_events
            .iter()
            .all(|e| e.kind != event_types::COMPLETE_UNBONDING));
        let block = chain.next_block(&[]);
        assert!(block
            .end_block_events
            .iter()
            .any(|e| e.kind == event_types::COMPLETE_UNBONDING));
        assert_eq!(chain.balance(&delegator.address), 5_000_000);
        let pending: Vec<Value> = chain.query_json("staking/unbonding").unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn test_full_self_undelegation_drops_validator_and_chain_continues() {
        let validator = Actor::from_seed(1);
        let mut chain = TestChain::new(&genesis(&[]));
        chain.next_block(&[]);

        let undelegate = Msg::new(
            MSG_UNDELEGATE_TYPE_URL,
            &MsgUndelegate {
                delegator: validator.address,
                validator: validator.address,
                amount: bond(VALIDATOR_BOND),
            },
        )
        .unwrap();
        let tx = chain.sign(&validator, vec![undelegate], "");
        let block = chain.next_block(&[tx]);
        assert!(block.results[0].is_ok(), "{}", block.results[0].log);
        assert_eq!(
            block.validator_updates,
            vec![ValidatorUpdate {
                pub_key: validator.pub_key,
                power: 0
            }]
        );
        assert!(!chain.app.is_halted());

        // Undelegation moved the stake out of the bonded pool; end-block moves nothing.
        let pool: Value = chain.query_json("staking/pool").unwrap();
        assert_eq!(pool["bonded_tokens"], "0");
        assert_eq!(pool["not_bonded_tokens"], "10000000");
        let validators: Vec<Validator> = chain.query_json("staking/validators").unwrap();
        assert!(validators.is_empty());
        let pending: Vec<Value> = chain.query_json("staking/unbonding").unwrap();
        assert_eq!(pending.len(), 1);

        for _ in 0..2 {
            let block = chain.next_block(&[]);
            assert!(block.validator_updates.is_empty());
        }
        assert_eq!(chain.height(), 4);
        assert!(!chain.app.is_halted());
    }

    #[test]
    fn test_wrong_bond_denom_rejected_without_state_change() {
        let a = Actor::from_seed(40);
        let mut chain = TestChain::new(&genesis(&[(&a, "5000000stake,100atom")]));
        chain.next_block(&[]);
        let msg = Msg::new(
            MSG_CREATE_VALIDATOR_TYPE_URL,
            &MsgCreateValidator {
                operator: a.address,
                pub_key: a.pub_key,
                moniker: "wrong-denom".into(),
                value: Coin::new("atom", 100),
            },
        )
        .unwrap();
        let tx = chain.sign(&a, vec![msg], "");
        let block = chain.next_block(&[tx]);
        assert!(!block.results[0].is_ok());
        assert!(block.validator_updates.is_empty());
        let validators: Vec<Validator> = chain.query_json("staking/validators").unwrap();
        assert_eq!(validators.len(), 1);
    }
}
