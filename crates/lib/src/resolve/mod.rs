//! Dependency closure over the catalog.
//!
//! Only skills declare dependencies (on agents, MCP servers and other skills).
//! The closure of a selection is every descriptor reachable from it; orphans
//! are former dependencies nothing selected needs anymore.
//!
//! Dependency cycles are legal. Traversal keeps a discovered set, so a cycle
//! simply ends the walk along that path.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use tracing::{debug, warn};

use crate::component::{Catalog, Category, ComponentId};

/// Graph of declared dependencies, one node per catalog descriptor.
///
/// Edges point from a skill to what it requires. References to descriptors
/// missing from the catalog are dropped with a warning.
pub struct DependencyGraph {
  graph: DiGraph<ComponentId, ()>,
  nodes: HashMap<ComponentId, NodeIndex>,
}

impl DependencyGraph {
  pub fn from_catalog(catalog: &Catalog) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for descriptor in catalog.iter() {
      let idx = graph.add_node(descriptor.id.clone());
      nodes.insert(descriptor.id.clone(), idx);
    }

    for descriptor in catalog.by_category(Category::Skill) {
      let from = nodes[&descriptor.id];
      for dependency in &descriptor.dependencies {
        match nodes.get(dependency) {
          Some(&to) => {
            graph.add_edge(from, to, ());
          }
          None => {
            warn!(skill = %descriptor.id, dependency = %dependency, "dependency not found in catalog, ignoring");
          }
        }
      }
    }

    Self { graph, nodes }
  }

  /// Every descriptor reachable from `seeds`, seeds included.
  ///
  /// Seeds absent from the catalog are skipped.
  pub fn closure<'a>(&self, seeds: impl IntoIterator<Item = &'a ComponentId>) -> BTreeSet<ComponentId> {
    let mut dfs = Dfs::empty(&self.graph);
    let mut reached = BTreeSet::new();

    for seed in seeds {
      let Some(&start) = self.nodes.get(seed) else {
        debug!(id = %seed, "selected descriptor not in catalog");
        continue;
      };
      dfs.move_to(start);
      while let Some(idx) = dfs.next(&self.graph) {
        reached.insert(self.graph[idx].clone());
      }
    }

    reached
  }

  /// Groups of descriptors that depend on each other in a cycle.
  pub fn find_cycles(&self) -> Vec<Vec<ComponentId>> {
    tarjan_scc(&self.graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
      .map(|scc| {
        let mut ids: Vec<ComponentId> = scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
        ids.sort();
        ids
      })
      .collect()
  }
}

/// Expand a direct selection to its dependency closure.
pub fn expand_selection(selected: &BTreeSet<ComponentId>, catalog: &Catalog) -> BTreeSet<ComponentId> {
  let graph = DependencyGraph::from_catalog(catalog);
  for cycle in graph.find_cycles() {
    let members: Vec<String> = cycle.iter().map(ToString::to_string).collect();
    debug!(members = %members.join(", "), "dependency cycle");
  }

  let expanded = graph.closure(selected);
  debug!(selected = selected.len(), expanded = expanded.len(), "expanded selection");
  expanded
}

/// Former dependencies that the new selection no longer reaches.
///
/// A member of `previous_expanded` is an orphan when it is not in
/// `new_expanded` and was not itself in `previous_direct`.
pub fn compute_orphans(
  previous_expanded: &BTreeSet<ComponentId>,
  new_expanded: &BTreeSet<ComponentId>,
  previous_direct: &BTreeSet<ComponentId>,
) -> BTreeSet<ComponentId> {
  previous_expanded
    .iter()
    .filter(|id| !new_expanded.contains(*id) && !previous_direct.contains(*id))
    .cloned()
    .collect()
}
