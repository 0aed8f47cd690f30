use rustc_hash::FxHashMap;
use std::fmt;

/// Opaque handle into a [`ModuleGraph`], assigned in first-load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub id: ModuleId,
    /// Absolute, resolved path -- the graph's node identity.
    pub path: String,
    pub dependencies: Vec<ModuleId>,
    pub is_entry: bool,
}

/// A cycle found while computing a topological order or running the
/// standalone cycle detector. `cycle_path` lists module paths in traversal
/// order, closing back on the first element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub cycle_path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular dependency: {}", self.cycle_path.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

/// The module dependency graph backing the registry (`spec.md` §4.5).
///
/// Modules are identified by resolved absolute path; `ModuleId`s are handed
/// out in first-load order, which doubles as the tie-break used when two
/// dependencies are otherwise unordered.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<ModuleInfo>,
    path_to_id: FxHashMap<String, ModuleId>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module by path, returning its existing id if already
    /// present (add_module is idempotent w.r.t. path identity).
    pub fn add_module(&mut self, path: impl Into<String>, is_entry: bool) -> ModuleId {
        let path = path.into();
        if let Some(&id) = self.path_to_id.get(&path) {
            if is_entry {
                self.modules[id.0 as usize].is_entry = true;
            }
            return id;
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(ModuleInfo {
            id,
            path: path.clone(),
            dependencies: Vec::new(),
            is_entry,
        });
        self.path_to_id.insert(path, id);
        id
    }

    pub fn resolve(&self, path: &str) -> Option<ModuleId> {
        self.path_to_id.get(path).copied()
    }

    pub fn add_dependency(&mut self, from: ModuleId, to: ModuleId) {
        let deps = &mut self.modules[from.0 as usize].dependencies;
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn get(&self, id: ModuleId) -> &ModuleInfo {
        &self.modules[id.0 as usize]
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn entry_points(&self) -> Vec<ModuleId> {
        self.modules
            .iter()
            .filter(|m| m.is_entry)
            .map(|m| m.id)
            .collect()
    }

    /// Modules not reachable from any of `roots` -- dead-code candidates.
    pub fn unreachable_from(&self, roots: &[ModuleId]) -> Vec<ModuleId> {
        let mut reached = vec![false; self.modules.len()];
        let mut stack: Vec<ModuleId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if reached[id.0 as usize] {
                continue;
            }
            reached[id.0 as usize] = true;
            for &dep in &self.modules[id.0 as usize].dependencies {
                stack.push(dep);
            }
        }
        self.modules
            .iter()
            .filter(|m| !reached[m.id.0 as usize])
            .map(|m| m.id)
            .collect()
    }

    /// Every strongly connected component of size > 1, i.e. every genuine
    /// dependency cycle in the graph (Tarjan's algorithm).
    pub fn find_cycles(&self) -> Vec<Vec<ModuleId>> {
        struct Tarjan<'g> {
            graph: &'g ModuleGraph,
            index_counter: u32,
            index: Vec<Option<u32>>,
            lowlink: Vec<u32>,
            on_stack: Vec<bool>,
            stack: Vec<ModuleId>,
            sccs: Vec<Vec<ModuleId>>,
        }
        impl<'g> Tarjan<'g> {
            fn visit(&mut self, v: ModuleId) {
                self.index[v.0 as usize] = Some(self.index_counter);
                self.lowlink[v.0 as usize] = self.index_counter;
                self.index_counter += 1;
                self.stack.push(v);
                self.on_stack[v.0 as usize] = true;

                for &w in &self.graph.modules[v.0 as usize].dependencies {
                    if self.index[w.0 as usize].is_none() {
                        self.visit(w);
                        self.lowlink[v.0 as usize] =
                            self.lowlink[v.0 as usize].min(self.lowlink[w.0 as usize]);
                    } else if self.on_stack[w.0 as usize] {
                        self.lowlink[v.0 as usize] =
                            self.lowlink[v.0 as usize].min(self.index[w.0 as usize].unwrap());
                    }
                }

                if self.lowlink[v.0 as usize] == self.index[v.0 as usize].unwrap() {
                    let mut component = Vec::new();
                    loop {
                        let w = self.stack.pop().unwrap();
                        self.on_stack[w.0 as usize] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    if component.len() > 1 {
                        self.sccs.push(component);
                    }
                }
            }
        }

        let n = self.modules.len();
        let mut tarjan = Tarjan {
            graph: self,
            index_counter: 0,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            sccs: Vec::new(),
        };
        for m in &self.modules {
            if tarjan.index[m.id.0 as usize].is_none() {
                tarjan.visit(m.id);
            }
        }
        tarjan.sccs
    }
}

/// Compute a deterministic topological order of all modules reachable from
/// `entry`, as a DFS postorder: dependencies are pushed before the modules
/// that depend on them, ties broken by first-load order (the order
/// dependencies were added).
pub fn topological_sort(graph: &ModuleGraph, entry: ModuleId) -> Result<Vec<ModuleId>, CycleError> {
    #[derive(PartialEq)]
    enum State {
        Visiting,
        Done,
    }

    let mut state: FxHashMap<ModuleId, State> = FxHashMap::default();
    let mut order = Vec::new();
    let mut path: Vec<ModuleId> = Vec::new();

    fn visit(
        graph: &ModuleGraph,
        id: ModuleId,
        state: &mut FxHashMap<ModuleId, State>,
        order: &mut Vec<ModuleId>,
        path: &mut Vec<ModuleId>,
    ) -> Result<(), CycleError> {
        match state.get(&id) {
            Some(State::Done) => return Ok(()),
            Some(State::Visiting) => {
                let start = path.iter().position(|&m| m == id).unwrap_or(0);
                let mut cycle_path: Vec<String> =
                    path[start..].iter().map(|m| graph.get(*m).path.clone()).collect();
                cycle_path.push(graph.get(id).path.clone());
                return Err(CycleError { cycle_path });
            }
            None => {}
        }
        state.insert(id, State::Visiting);
        path.push(id);
        for &dep in &graph.get(id).dependencies {
            visit(graph, dep, state, order, path)?;
        }
        path.pop();
        state.insert(id, State::Done);
        order.push(id);
        Ok(())
    }

    visit(graph, entry, &mut state, &mut order, &mut path)?;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_module_is_idempotent_by_path() {
        let mut g = ModuleGraph::new();
        let a1 = g.add_module("/a.som", true);
        let a2 = g.add_module("/a.som", false);
        assert_eq!(a1, a2);
        assert_eq!(g.module_count(), 1);
    }

    #[test]
    fn resolve_unknown_path_is_none() {
        let g = ModuleGraph::new();
        assert_eq!(g.resolve("/missing.som"), None);
    }

    #[test]
    fn linear_chain_orders_dependency_first() {
        let mut g = ModuleGraph::new();
        let a = g.add_module("/a.som", true);
        let b = g.add_module("/b.som", false);
        let c = g.add_module("/c.som", false);
        g.add_dependency(a, b);
        g.add_dependency(b, c);
        let order = topological_sort(&g, a).unwrap();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn diamond_each_module_appears_once() {
        let mut g = ModuleGraph::new();
        let a = g.add_module("/a.som", true);
        let b = g.add_module("/b.som", false);
        let c = g.add_module("/c.som", false);
        let d = g.add_module("/d.som", false);
        g.add_dependency(a, b);
        g.add_dependency(a, c);
        g.add_dependency(b, d);
        g.add_dependency(c, d);
        let order = topological_sort(&g, a).unwrap();
        assert_eq!(order.len(), 4);
        let pos = |id: ModuleId| order.iter().position(|x| *x == id).unwrap();
        assert!(pos(d) < pos(b));
        assert!(pos(d) < pos(c));
        assert!(pos(b) < pos(a));
        assert!(pos(c) < pos(a));
    }

    #[test]
    fn direct_cycle_is_detected() {
        let mut g = ModuleGraph::new();
        let a = g.add_module("/a.som", true);
        let b = g.add_module("/b.som", false);
        g.add_dependency(a, b);
        g.add_dependency(b, a);
        let err = topological_sort(&g, a).unwrap_err();
        assert!(err.cycle_path.contains(&"/a.som".to_string()));
        assert!(err.cycle_path.contains(&"/b.som".to_string()));
    }

    #[test]
    fn self_cycle_is_detected() {
        let mut g = ModuleGraph::new();
        let a = g.add_module("/a.som", true);
        g.add_dependency(a, a);
        let err = topological_sort(&g, a).unwrap_err();
        assert_eq!(err.cycle_path, vec!["/a.som".to_string(), "/a.som".to_string()]);
    }

    #[test]
    fn find_cycles_reports_scc() {
        let mut g = ModuleGraph::new();
        let a = g.add_module("/a.som", true);
        let b = g.add_module("/b.som", false);
        let c = g.add_module("/c.som", false);
        g.add_dependency(a, b);
        g.add_dependency(b, c);
        g.add_dependency(c, b);
        let sccs = g.find_cycles();
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), 2);
    }

    #[test]
    fn unreachable_from_finds_dead_modules() {
        let mut g = ModuleGraph::new();
        let a = g.add_module("/a.som", true);
        let b = g.add_module("/b.som", false);
        let orphan = g.add_module("/orphan.som", false);
        g.add_dependency(a, b);
        let dead = g.unreachable_from(&[a]);
        assert_eq!(dead, vec![orphan]);
    }
}
