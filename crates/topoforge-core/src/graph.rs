use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Summary of dependency graph structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for dependency ordering over an index-addressed arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphReport {
    pub summary: GraphSummary,
    /// Nodes in an order where every dependency precedes its dependents.
    pub topo_order: Option<Vec<usize>>,
    /// Nodes left unresolved when the graph has a cycle.
    pub cycle: Option<Vec<usize>>,
    /// `(node, dependency)` pairs whose dependency is outside the arena.
    pub dangling: Vec<(usize, usize)>,
}

/// Build a deterministic ordering report.
///
/// `depends_on[i]` lists the nodes node `i` must come after. Ties are broken
/// by the smallest index so the order is stable across runs.
pub fn build_graph_report<'a, I>(depends_on: I) -> GraphReport
where
    I: IntoIterator<Item = &'a BTreeSet<usize>>,
{
    let deps: Vec<&BTreeSet<usize>> = depends_on.into_iter().collect();
    let nodes = deps.len();

    let mut dependents: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut dangling = Vec::new();
    let mut edges = 0;

    for (node, targets) in deps.iter().enumerate() {
        dependents.entry(node).or_default();
        for &target in targets.iter() {
            if target >= nodes {
                dangling.push((node, target));
                continue;
            }
            edges += 1;
            dependents.entry(target).or_default().insert(node);
        }
    }

    let summary = GraphSummary { nodes, edges };

    match toposort(&dependents) {
        Ok(order) => GraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
            dangling,
        },
        Err(cycle) => GraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
            dangling,
        },
    }
}

fn toposort(graph: &BTreeMap<usize, BTreeSet<usize>>) -> Result<Vec<usize>, Vec<usize>> {
    let mut indegree: BTreeMap<usize, usize> = graph.keys().map(|node| (*node, 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .filter_map(|(node, count)| if *count == 0 { Some(*node) } else { None })
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<usize> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle_nodes)
    }
}
