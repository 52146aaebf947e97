//! # Block Lifecycle
//!
//! Phase transitions of the chain application, commit semantics, versioned
//! queries and the terminal halted phase.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use node_runtime::app::{
        AppPhase, BeginBlockRequest, BlockStage, ChainApp, EndBlockRequest, QueryRequest,
    };
    use mc_01_store::InMemoryVersionedStore;
    use shared_types::{codes, FatalError};

    #[test]
    fn test_phases_follow_block_lifecycle() {
        let mut app = ChainApp::new(test_config(), Box::new(InMemoryVersionedStore::new())).unwrap();
        assert_eq!(app.phase(), &AppPhase::Uninitialized);
        app.load_latest_version().unwrap();
        assert_eq!(app.phase(), &AppPhase::Ready);
        app.init_chain(genesis(&[]).to_init_chain_request().unwrap())
            .unwrap();
        assert_eq!(app.phase(), &AppPhase::Ready);

        let mut chain = TestChain {
            app,
            genesis_validators: Vec::new(),
        };
        let header = chain.next_header();
        chain
            .app
            .begin_block(BeginBlockRequest { header })
            .unwrap();
        assert_eq!(chain.app.phase(), &AppPhase::InBlock(BlockStage::Began));
        chain.app.end_block(EndBlockRequest { height: 1 }).unwrap();
        assert_eq!(chain.app.phase(), &AppPhase::InBlock(BlockStage::Ended));
        chain.app.commit().unwrap();
        assert_eq!(chain.app.phase(), &AppPhase::Committed);
        assert_eq!(chain.height(), 1);
    }

    #[test]
    fn test_second_commit_rejected_without_touching_state() {
        let mut chain = TestChain::new(&genesis(&[]));
        let block = chain.next_block(&[]);

        let err = chain.app.commit().unwrap_err();
        assert!(matches!(err, FatalError::UnexpectedCall { .. }));
        assert!(!chain.app.is_halted());
        assert_eq!(chain.height(), 1);
        assert_eq!(chain.app.info().last_block_app_hash, block.app_hash);

        // The chain keeps going afterwards.
        assert_eq!(chain.next_block(&[]).height, 2);
    }

    #[test]
    fn test_commit_before_end_block_rejected() {
        let mut chain = TestChain::new(&genesis(&[]));
        let header = chain.next_header();
        chain
            .app
            .begin_block(BeginBlockRequest { header })
            .unwrap();
        assert!(matches!(
            chain.app.commit().unwrap_err(),
            FatalError::UnexpectedCall { .. }
        ));
        assert_eq!(chain.height(), 0);
        chain.app.end_block(EndBlockRequest { height: 1 }).unwrap();
        assert_eq!(chain.app.commit().unwrap().height, 1);
    }

    #[test]
    fn test_deliver_outside_block_rejected() {
        let mut chain = TestChain::new(&genesis(&[]));
        let err = chain.app.deliver_tx(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, FatalError::UnexpectedCall { .. }));
        assert!(!chain.app.is_halted());
    }

    #[test]
    fn test_begin_block_before_genesis_rejected() {
        let mut app = ChainApp::new(test_config(), Box::new(InMemoryVersionedStore::new())).unwrap();
        app.load_latest_version().unwrap();
        let chain = TestChain {
            app,
            genesis_validators: Vec::new(),
        };
        let header = chain.next_header();
        let mut app = chain.app;
        assert!(matches!(
            app.begin_block(BeginBlockRequest { header }).unwrap_err(),
            FatalError::UnexpectedCall { .. }
        ));
    }

    #[test]
    fn test_height_gap_halts_and_rejects_everything_after() {
        let mut chain = TestChain::new(&genesis(&[]));
        chain.next_block(&[]);
        let mut header = chain.next_header();
        header.height += 1;

        let err = chain
            .app
            .begin_block(BeginBlockRequest { header })
            .unwrap_err();
        assert!(matches!(err, FatalError::UnexpectedCall { .. }));
        assert!(chain.app.is_halted());

        let header = chain.next_header();
        assert!(matches!(
            chain.app.begin_block(BeginBlockRequest { header }).unwrap_err(),
            FatalError::Halted { .. }
        ));
        assert!(matches!(
            chain.app.check_tx(&[0], node_runtime::app::CheckTxKind::New).unwrap_err(),
            FatalError::Halted { .. }
        ));
        assert!(!chain.app.query(&QueryRequest::latest("app/version")).is_ok());
        // Committed state survives the halt.
        assert_eq!(chain.height(), 1);
    }

    #[test]
    fn test_query_reads_committed_versions_only() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);

        let tx = chain.sign(&a, vec![send_msg(a.address, b.address, "30stake")], "");
        let header = chain.next_header();
        chain
            .app
            .begin_block(BeginBlockRequest { header })
            .unwrap();
        assert!(chain.app.deliver_tx(&tx).unwrap().is_ok());
        // Delivered but not committed.
        assert_eq!(chain.balance(&b.address), 0);
        chain.app.end_block(EndBlockRequest { height: 2 }).unwrap();
        chain.app.commit().unwrap();
        assert_eq!(chain.balance(&b.address), 30);

        let path = format!("bank/balance/{}/{DENOM}", b.address);
        let old = chain.app.query(&QueryRequest {
            path: path.clone(),
            data: Vec::new(),
            height: 1,
        });
        assert!(old.is_ok());
        assert_eq!(old.height, 1);
        let coin: shared_types::Coin = serde_json::from_slice(&old.value).unwrap();
        assert_eq!(coin.amount, 0);

        let future = chain.app.query(&QueryRequest {
            path,
            data: Vec::new(),
            height: 9,
        });
        assert_eq!(future.code, codes::INVALID_REQUEST);
    }

    #[test]
    fn test_unknown_query_route() {
        let mut chain = TestChain::new(&genesis(&[]));
        chain.next_block(&[]);
        let res = chain.app.query(&QueryRequest::latest("governance/proposals"));
        assert_eq!(res.code, codes::UNKNOWN_REQUEST);
    }

    #[test]
    fn test_app_queries_and_info() {
        let mut chain = TestChain::new(&genesis(&[]));
        let block = chain.next_block(&[]);
        let versions: std::collections::BTreeMap<String, u64> =
            chain.query_json("app/module_versions").unwrap();
        assert_eq!(versions.len(), 6);
        let info = chain.app.info();
        assert_eq!(info.last_block_height, 1);
        assert_eq!(info.last_block_app_hash, block.app_hash);
        assert_eq!(info.module_versions, versions);
    }

    #[test]
    fn test_load_version_rolls_back_and_replays_identically() {
        let a = Actor::from_seed(10);
        let b = Actor::from_seed(11);
        let mut chain = TestChain::new(&genesis(&[(&a, "100stake")]));
        chain.next_block(&[]);
        let tx = chain.sign(&a, vec![send_msg(a.address, b.address, "30stake")], "");
        let first = chain.next_block(&[tx.clone()]);
        chain.next_block(&[]);

        chain.app.load_version(1).unwrap();
        assert_eq!(chain.height(), 1);
        assert_eq!(chain.balance(&b.address), 0);

        // Memory partitions are rebuilt by the next begin-block.
        let replayed = chain.next_block(&[tx]);
        assert_eq!(replayed, first);
        assert_eq!(chain.balance(&b.address), 30);
    }

    #[test]
    fn test_check_tx_before_load_rejected() {
        let mut app = ChainApp::new(test_config(), Box::new(InMemoryVersionedStore::new())).unwrap();
        assert!(matches!(
            app.check_tx(&[0], node_runtime::app::CheckTxKind::New).unwrap_err(),
            FatalError::UnexpectedCall { .. }
        ));
    }
}
