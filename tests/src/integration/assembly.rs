//! # Application Assembly
//!
//! Construction-time validation: lifecycle orders, ordering constraints,
//! the module account permission table and keeper wiring. Every failure
//! here must surface before any block is processed.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use mc_01_store::{InMemoryVersionedStore, StoreKind};
    use node_runtime::app::ChainApp;
    use node_runtime::container::AppConfig;
    use node_runtime::registry::{OrderConstraint, Phase};
    use shared_types::{module_names, FatalError};

    fn build(config: AppConfig) -> Result<ChainApp, FatalError> {
        ChainApp::new(config, Box::new(InMemoryVersionedStore::new()))
    }

    fn swap(order: &mut [String], a: &str, b: &str) {
        let i = order.iter().position(|m| m == a).unwrap();
        let j = order.iter().position(|m| m == b).unwrap();
        order.swap(i, j);
    }

    #[test]
    fn test_default_config_assembles() {
        let app = build(test_config()).unwrap();
        let mut names = app.manager().module_names();
        names.sort();
        assert_eq!(
            names,
            vec!["auth", "bank", "capability", "genutil", "params", "staking"]
        );
        assert_eq!(
            app.runner().router().message_types().len(),
            4,
            "bank send plus three staking messages"
        );
    }

    #[test]
    fn test_genesis_order_violation_fails_construction() {
        let mut config = test_config();
        swap(&mut config.orders.genesis, module_names::BANK, module_names::STAKING);
        let err = build(config).err().unwrap();
        assert_eq!(
            err,
            FatalError::OrderingViolation {
                phase: "genesis".into(),
                before: "bank".into(),
                after: "staking".into(),
            }
        );
    }

    #[test]
    fn test_declared_constraint_checked_for_end_block() {
        let mut config = test_config();
        config.constraints.push(OrderConstraint::new(
            Phase::EndBlock,
            module_names::BANK,
            module_names::STAKING,
        ));
        let err = build(config).err().unwrap();
        assert!(matches!(err, FatalError::OrderingViolation { .. }), "{err:?}");
    }

    #[test]
    fn test_capability_must_begin_first() {
        let mut config = test_config();
        swap(
            &mut config.orders.begin_block,
            module_names::CAPABILITY,
            module_names::STAKING,
        );
        assert!(matches!(
            build(config).err().unwrap(),
            FatalError::OrderingViolation { .. }
        ));
    }

    #[test]
    fn test_incomplete_order_fails_construction() {
        let mut config = test_config();
        config.orders.end_block.retain(|m| m != module_names::GENUTIL);
        let err = build(config).err().unwrap();
        match err {
            FatalError::IncompleteOrder { phase, missing } => {
                assert_eq!(phase, "end_block");
                assert_eq!(missing, vec!["genutil".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_and_duplicate_names_rejected() {
        let mut config = test_config();
        config.orders.begin_block.push("governance".into());
        assert!(matches!(
            build(config).err().unwrap(),
            FatalError::UnknownModule { .. }
        ));

        let mut config = test_config();
        config.orders.genesis.push(module_names::PARAMS.into());
        assert!(matches!(
            build(config).err().unwrap(),
            FatalError::DuplicateInOrder { .. }
        ));
    }

    #[test]
    fn test_missing_pool_permission_fails_construction() {
        let mut config = test_config();
        config
            .module_account_permissions
            .remove(module_names::NOT_BONDED_POOL);
        assert!(matches!(
            build(config).err().unwrap(),
            FatalError::MissingModulePermission { .. }
        ));
    }

    #[test]
    fn test_empty_chain_id_rejected() {
        let mut config = test_config();
        config.chain_id.clear();
        assert!(matches!(build(config).err().unwrap(), FatalError::Config(_)));
    }

    #[test]
    fn test_keepers_wired_with_own_partitions_and_subspaces() {
        let app = build(test_config()).unwrap();
        let keepers = app.keepers();

        let order = keepers.construction_order();
        let pos = |name: &str| order.iter().position(|k| *k == name).unwrap();
        assert!(pos("params") < pos("auth"));
        assert!(pos("auth") < pos("bank"));
        assert!(pos("bank") < pos("staking"));

        assert_eq!(keepers.params.subspace_names(), vec!["auth", "bank", "staking"]);

        let mounted = keepers.mounted_keys();
        assert_eq!(mounted.len(), 7);
        let transient = mounted
            .iter()
            .filter(|k| k.kind() == StoreKind::Transient)
            .count();
        let memory = mounted
            .iter()
            .filter(|k| k.kind() == StoreKind::Memory)
            .count();
        assert_eq!((transient, memory), (1, 1));
        assert!(keepers.capability.is_sealed());
    }

    #[test]
    fn test_instances_do_not_share_store_keys() {
        let first = build(test_config()).unwrap();
        let second = build(test_config()).unwrap();
        assert_ne!(first.keepers().keys.bank, second.keepers().keys.bank);
    }
}
