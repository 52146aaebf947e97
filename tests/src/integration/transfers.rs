//! # Transfer Flows
//!
//! Signed bank transfers through admission, routing and the bank keeper:
//! balances, events, replay protection, fees and message atomicity.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use mc_09_ante::{FeePolicy, GasPrices};
    use shared_types::{codes, event_types, module_names, Address};

    fn has_event(events: &[shared_types::Event], kind: &str) -> bool {
        events.iter().any(|e| e.kind == kind)
    }

    #[test]
    fn test_transfer_moves_balance_and_emits_event() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);

        let tx = chain.sign(&a, vec![send_msg(a.address, b.address, "30stake")], "");
        let block = chain.next_block(&[tx]);
        let result = &block.results[0];
        assert!(result.is_ok(), "{}", result.log);
        assert!(result.gas_used > 0);
        assert!(result.gas_used <= result.gas_wanted);
        assert!(has_event(&result.events, event_types::TRANSFER));
        let transfer = result
            .events
            .iter()
            .find(|e| e.kind == event_types::TRANSFER)
            .unwrap();
        assert_eq!(transfer.get(event_types::ATTR_AMOUNT), Some("30stake"));

        assert_eq!(chain.balance(&a.address), 70);
        assert_eq!(chain.balance(&b.address), 30);
        assert_eq!(chain.account(&a.address).unwrap().sequence(), 1);
    }

    #[test]
    fn test_redelivered_bytes_rejected_as_replay() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);

        let tx = chain.sign(&a, vec![send_msg(a.address, b.address, "30stake")], "");
        chain.next_block(&[tx.clone()]);
        let block = chain.next_block(&[tx]);
        let result = &block.results[0];
        assert_eq!(result.code, codes::WRONG_SEQUENCE);
        assert_eq!(result.codespace, codes::ROOT_CODESPACE);
        assert_eq!(chain.balance(&a.address), 70);
        assert_eq!(chain.balance(&b.address), 30);
    }

    #[test]
    fn test_insufficient_fee_balance_rejected_before_handlers() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "5stake")]));
        chain.next_block(&[]);
        let before = chain.account(&a.address).unwrap();

        let tx = chain.sign(&a, vec![send_msg(a.address, b.address, "1stake")], "10stake");
        let block = chain.next_block(&[tx]);
        let result = &block.results[0];
        assert_eq!(result.code, codes::INSUFFICIENT_FUNDS);
        assert!(!has_event(&result.events, event_types::MESSAGE));
        assert!(!has_event(&result.events, event_types::TRANSFER));

        assert_eq!(chain.balance(&a.address), 5);
        assert_eq!(chain.balance(&b.address), 0);
        assert_eq!(chain.account(&a.address).unwrap(), before);
    }

    #[test]
    fn test_fee_collected_and_sequence_kept_when_message_fails() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);

        // Second send overdraws; the first must be rolled back with it.
        let tx = chain.sign(
            &a,
            vec![
                send_msg(a.address, b.address, "40stake"),
                send_msg(a.address, b.address, "70stake"),
            ],
            "3stake",
        );
        let block = chain.next_block(&[tx]);
        let result = &block.results[0];
        assert_eq!(result.code, codes::INSUFFICIENT_FUNDS);
        assert!(result.data.is_empty());

        assert_eq!(chain.balance(&a.address), 97);
        assert_eq!(chain.balance(&b.address), 0);
        assert_eq!(
            chain.balance(&Address::module(module_names::FEE_COLLECTOR)),
            3
        );
        assert_eq!(chain.account(&a.address).unwrap().sequence(), 1);
    }

    #[test]
    fn test_malformed_bytes_rejected_with_zero_gas() {
        let mut chain = TestChain::new(&genesis(&[]));
        chain.next_block(&[]);
        let block = chain.next_block(&[vec![0xFF, 0x00, 0x13]]);
        let result = &block.results[0];
        assert_eq!(result.code, codes::TX_DECODE);
        assert_eq!(result.gas_used, 0);
        assert_eq!(result.gas_wanted, 0);
    }

    #[test]
    fn test_unknown_signer_rejected() {
        let stranger = Actor::from_seed(99);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[]));
        chain.next_block(&[]);
        let tx = sign_with(&stranger, 0, 0, vec![send_msg(stranger.address, b.address, "1stake")], "");
        let block = chain.next_block(&[tx]);
        assert_eq!(block.results[0].code, codes::UNKNOWN_ADDRESS);
    }

    #[test]
    fn test_send_to_module_account_is_blocked() {
        let a = Actor::from_seed(10);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);
        let pool = Address::module(module_names::BONDED_POOL);
        let before = chain.balance(&pool);
        let tx = chain.sign(&a, vec![send_msg(a.address, pool, "10stake")], "");
        let block = chain.next_block(&[tx]);
        assert_eq!(block.results[0].code, codes::UNAUTHORIZED);
        assert_eq!(chain.balance(&pool), before);
        assert_eq!(chain.balance(&a.address), 100);
    }

    #[test]
    fn test_check_tx_enforces_min_gas_price_but_deliver_does_not() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut config = test_config();
        config.ante = FeePolicy {
            min_gas_prices: "0.001stake".parse::<GasPrices>().unwrap(),
            ..config.ante
        };
        let mut chain = TestChain::with_config(config, &genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);

        let cheap = chain.sign(&a, vec![send_msg(a.address, b.address, "1stake")], "");
        let checked = chain.check(&cheap);
        assert_eq!(checked.code, codes::INSUFFICIENT_FEE);

        let block = chain.next_block(&[cheap]);
        assert!(block.results[0].is_ok(), "{}", block.results[0].log);
    }

    #[test]
    fn test_check_state_tracks_sequences_until_commit() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);
        let number = chain.account(&a.address).unwrap().account_number();

        let first = sign_with(&a, number, 0, vec![send_msg(a.address, b.address, "1stake")], "");
        let second = sign_with(&a, number, 1, vec![send_msg(a.address, b.address, "1stake")], "");
        assert!(chain.check(&first).is_ok());
        assert!(chain.check(&second).is_ok());
        // Same bytes again: the check state already advanced the sequence.
        assert_eq!(chain.check(&first).code, codes::WRONG_SEQUENCE);

        // Check never touches committed state.
        assert_eq!(chain.account(&a.address).unwrap().sequence(), 0);

        chain.next_block(&[first]);
        assert!(chain.check(&second).is_ok());
    }

    #[test]
    fn test_check_during_open_block_sees_only_committed_state() {
        use node_runtime::app::{BeginBlockRequest, EndBlockRequest};

        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);
        let number = chain.account(&a.address).unwrap().account_number();
        let first = sign_with(&a, number, 0, vec![send_msg(a.address, b.address, "1stake")], "");
        let second = sign_with(&a, number, 1, vec![send_msg(a.address, b.address, "1stake")], "");

        let header = chain.next_header();
        let height = header.height;
        chain.app.begin_block(BeginBlockRequest { header }).unwrap();
        assert!(chain.app.deliver_tx(&first).unwrap().is_ok());

        // The delivered sequence bump is not committed yet.
        assert_eq!(chain.check(&second).code, codes::WRONG_SEQUENCE);
        assert!(chain.check(&first).is_ok());

        chain.app.end_block(EndBlockRequest { height }).unwrap();
        chain.app.commit().unwrap();
        assert!(chain.check(&second).is_ok());
        assert_eq!(chain.check(&first).code, codes::WRONG_SEQUENCE);
    }

    #[test]
    fn test_simulate_reports_gas_without_writing() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);
        let tx = chain.sign(&a, vec![send_msg(a.address, b.address, "30stake")], "");

        let simulated = chain.app.simulate(&tx).unwrap();
        assert!(simulated.is_ok(), "{}", simulated.log);
        assert!(simulated.gas_used > 0);

        let block = chain.next_block(&[tx]);
        assert!(block.results[0].is_ok());
        assert_eq!(chain.balance(&b.address), 30);
    }
}
