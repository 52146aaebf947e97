//! # Execution Orders
//!
//! Each lifecycle phase runs modules in an explicit, configured order. The
//! order is validated once at construction; nothing is ever inferred from
//! registration order.

use mc_02_module::AppModule;
use serde::{Deserialize, Serialize};
use shared_types::{module_names, FatalError};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle phase an order applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Genesis,
    BeginBlock,
    EndBlock,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genesis => "genesis",
            Self::BeginBlock => "begin_block",
            Self::EndBlock => "end_block",
        }
    }

    /// True when `module` declares a hook for this phase.
    pub fn declared_by(&self, module: &AppModule) -> bool {
        match self {
            Self::Genesis => module.genesis.is_declared(),
            Self::BeginBlock => module.begin_block.is_declared(),
            Self::EndBlock => module.end_block.is_declared(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `before` must run ahead of `after` in `phase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConstraint {
    pub phase: Phase,
    pub before: String,
    pub after: String,
}

impl OrderConstraint {
    pub fn new(phase: Phase, before: &str, after: &str) -> Self {
        Self {
            phase,
            before: before.to_string(),
            after: after.to_string(),
        }
    }

    /// Constraints the built-in modules rely on.
    ///
    /// Genesis: capability, auth, bank, staking and genutil run in that
    /// order. Begin-block: capability runs first so its in-memory index is
    /// rebuilt before any other module could use it.
    pub fn defaults() -> Vec<Self> {
        use module_names::*;
        let mut constraints: Vec<Self> = [CAPABILITY, AUTH, BANK, STAKING, GENUTIL]
            .windows(2)
            .map(|pair| Self::new(Phase::Genesis, pair[0], pair[1]))
            .collect();
        constraints.extend(
            [STAKING, AUTH, GENUTIL, PARAMS, BANK]
                .iter()
                .map(|m| Self::new(Phase::BeginBlock, CAPABILITY, m)),
        );
        constraints
    }
}

/// The configured order of every phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOrders {
    pub genesis: Vec<String>,
    pub begin_block: Vec<String>,
    pub end_block: Vec<String>,
}

impl Default for ModuleOrders {
    fn default() -> Self {
        use module_names::*;
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            genesis: names(&[CAPABILITY, AUTH, BANK, STAKING, GENUTIL, PARAMS]),
            begin_block: names(&[CAPABILITY, STAKING, AUTH, GENUTIL, PARAMS, BANK]),
            end_block: names(&[CAPABILITY, STAKING, AUTH, GENUTIL, PARAMS, BANK]),
        }
    }
}

impl ModuleOrders {
    pub fn get(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Genesis => &self.genesis,
            Phase::BeginBlock => &self.begin_block,
            Phase::EndBlock => &self.end_block,
        }
    }
}

/// Check one phase's order against the registered modules.
///
/// Every listed name must be registered, listed once and declare the
/// phase's hook; every module declaring the hook must be listed.
pub fn validate_order(
    phase: Phase,
    order: &[String],
    modules: &BTreeMap<String, AppModule>,
) -> Result<(), FatalError> {
    let mut seen = BTreeSet::new();
    for name in order {
        let module = modules.get(name).ok_or_else(|| FatalError::UnknownModule {
            phase: phase.to_string(),
            name: name.clone(),
        })?;
        if !seen.insert(name.as_str()) {
            return Err(FatalError::DuplicateInOrder {
                phase: phase.to_string(),
                name: name.clone(),
            });
        }
        if !phase.declared_by(module) {
            return Err(FatalError::UndeclaredHook {
                phase: phase.to_string(),
                name: name.clone(),
            });
        }
    }
    let missing: Vec<String> = modules
        .values()
        .filter(|m| phase.declared_by(m) && !seen.contains(m.name.as_str()))
        .map(|m| m.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(FatalError::IncompleteOrder {
            phase: phase.to_string(),
            missing,
        });
    }
    Ok(())
}

/// Check `constraints` against validated orders. A constraint naming a
/// module absent from its phase is a violation.
pub fn check_constraints(
    orders: &ModuleOrders,
    constraints: &[OrderConstraint],
) -> Result<(), FatalError> {
    for c in constraints {
        let order = orders.get(c.phase);
        let position = |name: &str| order.iter().position(|n| n == name);
        match (position(&c.before), position(&c.after)) {
            (Some(b), Some(a)) if b < a => {}
            _ => {
                return Err(FatalError::OrderingViolation {
                    phase: c.phase.to_string(),
                    before: c.before.clone(),
                    after: c.after.clone(),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_02_module::Hook;

    fn modules() -> BTreeMap<String, AppModule> {
        ["a", "b", "c"]
            .iter()
            .map(|n| {
                let m = AppModule::new(*n, 1)
                    .with_genesis(Hook::NoOp)
                    .with_begin_block(if *n == "c" { Hook::Absent } else { Hook::NoOp });
                (n.to_string(), m)
            })
            .collect()
    }

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_order() {
        assert!(validate_order(Phase::Genesis, &order(&["c", "a", "b"]), &modules()).is_ok());
        assert!(validate_order(Phase::BeginBlock, &order(&["b", "a"]), &modules()).is_ok());
    }

    #[test]
    fn test_incomplete_order_names_missing() {
        let err = validate_order(Phase::Genesis, &order(&["a"]), &modules()).unwrap_err();
        assert_eq!(
            err,
            FatalError::IncompleteOrder {
                phase: "genesis".into(),
                missing: vec!["b".into(), "c".into()],
            }
        );
    }

    #[test]
    fn test_unknown_duplicate_and_undeclared() {
        let m = modules();
        assert!(matches!(
            validate_order(Phase::Genesis, &order(&["a", "b", "c", "x"]), &m),
            Err(FatalError::UnknownModule { .. })
        ));
        assert!(matches!(
            validate_order(Phase::Genesis, &order(&["a", "a", "b", "c"]), &m),
            Err(FatalError::DuplicateInOrder { .. })
        ));
        assert!(matches!(
            validate_order(Phase::BeginBlock, &order(&["a", "b", "c"]), &m),
            Err(FatalError::UndeclaredHook { .. })
        ));
    }

    #[test]
    fn test_default_orders_satisfy_default_constraints() {
        assert!(check_constraints(&ModuleOrders::default(), &OrderConstraint::defaults()).is_ok());
    }

    #[test]
    fn test_staking_before_bank_violates_genesis_constraint() {
        let mut orders = ModuleOrders::default();
        orders.genesis = order(&["capability", "auth", "staking", "bank", "genutil", "params"]);
        let err = check_constraints(&orders, &OrderConstraint::defaults()).unwrap_err();
        assert_eq!(
            err,
            FatalError::OrderingViolation {
                phase: "genesis".into(),
                before: "bank".into(),
                after: "staking".into(),
            }
        );
    }
}
