//! Dependency-graph queries over loaded modules (`spec.md` §4.5, "Registry").
//!
//! Thin façade over [`somon_common::ModuleGraph`] -- the graph algorithms
//! themselves (topological sort, cycle detection, reachability) already
//! live there; this module is the registry's query surface.

use somon_common::{topological_sort, CycleError, ModuleGraph, ModuleId};

pub struct Registry<'g> {
    graph: &'g ModuleGraph,
}

impl<'g> Registry<'g> {
    pub fn new(graph: &'g ModuleGraph) -> Self {
        Self { graph }
    }

    /// Deterministic topological order of everything reachable from `entry`.
    pub fn topological_order(&self, entry: ModuleId) -> Result<Vec<ModuleId>, CycleError> {
        topological_sort(self.graph, entry)
    }

    /// Every strongly connected component of size > 1.
    pub fn cycles(&self) -> Vec<Vec<ModuleId>> {
        self.graph.find_cycles()
    }

    pub fn entry_points(&self) -> Vec<ModuleId> {
        self.graph.entry_points()
    }

    /// Modules unreachable from any registered entry point.
    pub fn dead_code(&self) -> Vec<ModuleId> {
        self.graph.unreachable_from(&self.entry_points())
    }

    pub fn path_of(&self, id: ModuleId) -> &str {
        &self.graph.get(id).path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topological_order_respects_dependency_direction() {
        let mut graph = ModuleGraph::new();
        let entry = graph.add_module("/proj/main.som", true);
        let lib = graph.add_module("/proj/lib.som", false);
        graph.add_dependency(entry, lib);

        let registry = Registry::new(&graph);
        let order = registry.topological_order(entry).unwrap();
        assert_eq!(order, vec![lib, entry]);
    }

    #[test]
    fn dead_code_excludes_everything_reachable_from_an_entry() {
        let mut graph = ModuleGraph::new();
        let entry = graph.add_module("/proj/main.som", true);
        let used = graph.add_module("/proj/used.som", false);
        let orphan = graph.add_module("/proj/orphan.som", false);
        graph.add_dependency(entry, used);

        let registry = Registry::new(&graph);
        assert_eq!(registry.dead_code(), vec![orphan]);
    }
}
