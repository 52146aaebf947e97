//! # Keeper Dependency Graph
//!
//! Each keeper declares the keepers it depends on through
//! [`KeeperInfo`]. The graph is checked once at start-up: every dependency
//! must be registered and the graph must be acyclic. Construction then
//! follows the returned topological order.

use mc_02_module::KeeperInfo;
use shared_types::FatalError;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct KeeperGraph {
    edges: BTreeMap<&'static str, Vec<&'static str>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl KeeperGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, info: KeeperInfo) -> Result<(), FatalError> {
        if self.edges.insert(info.name, info.depends_on).is_some() {
            return Err(FatalError::DuplicateModule {
                name: info.name.to_string(),
            });
        }
        Ok(())
    }

    pub fn with(mut self, info: KeeperInfo) -> Result<Self, FatalError> {
        self.register(info)?;
        Ok(self)
    }

    /// Dependencies first; ties broken by name.
    pub fn topological_order(&self) -> Result<Vec<&'static str>, FatalError> {
        for (keeper, deps) in &self.edges {
            if let Some(dep) = deps.iter().find(|d| !self.edges.contains_key(*d)) {
                return Err(FatalError::UnregisteredDependency {
                    keeper: keeper.to_string(),
                    dependency: dep.to_string(),
                });
            }
        }
        let mut marks = BTreeMap::new();
        let mut order = Vec::with_capacity(self.edges.len());
        let mut path = Vec::new();
        for keeper in self.edges.keys() {
            self.visit(*keeper, &mut marks, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        keeper: &'static str,
        marks: &mut BTreeMap<&'static str, Mark>,
        path: &mut Vec<&'static str>,
        order: &mut Vec<&'static str>,
    ) -> Result<(), FatalError> {
        match marks.get(keeper) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|k| *k == keeper).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|k| k.to_string()).collect();
                cycle.push(keeper.to_string());
                return Err(FatalError::DependencyCycle { path: cycle });
            }
            None => {}
        }
        marks.insert(keeper, Mark::Visiting);
        path.push(keeper);
        let mut deps = self.edges.get(keeper).cloned().unwrap_or_default();
        deps.sort_unstable();
        for dep in deps {
            self.visit(dep, marks, path, order)?;
        }
        path.pop();
        marks.insert(keeper, Mark::Done);
        order.push(keeper);
        Ok(())
    }
}
