//! Critical path marking - the most expensive chain of operations.

use std::collections::HashMap;

use crate::graph::{NodeId, PlanGraph};

/// Mark the single most expensive root-to-leaf chain.
///
/// Every node's cumulative cost is its own cost plus the maximum cumulative
/// cost among its producers (0 for leaves), computed bottom-up with
/// memoization. The walk then starts at the root with the greatest
/// cumulative cost and greedily descends into the most expensive producer,
/// marking each visited node. Ties go to the first candidate in
/// discovery/attachment order. Exactly one path is marked per parse, even
/// when the graph has several roots.
pub fn mark(graph: &mut PlanGraph) {
    let mut memo: HashMap<NodeId, f64> = HashMap::new();

    let mut best: Option<(NodeId, f64)> = None;
    for root in graph.roots() {
        let total = cumulative_cost(graph, root, &mut memo);
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((root, total)),
        }
    }

    let Some((mut current, _)) = best else {
        return;
    };

    loop {
        graph.node_mut(current).is_critical_path = true;

        let mut next: Option<(NodeId, f64)> = None;
        for producer in graph.producers(current) {
            let total = cumulative_cost(graph, producer, &mut memo);
            match next {
                Some((_, best_total)) if total <= best_total => {}
                _ => next = Some((producer, total)),
            }
        }

        match next {
            Some((producer, _)) => current = producer,
            None => break,
        }
    }
}

/// Maximum cumulative cost along any path through a node's producers.
/// Cycles are impossible by construction: every edge attaches a level to
/// its own ancestor.
fn cumulative_cost(graph: &PlanGraph, id: NodeId, memo: &mut HashMap<NodeId, f64>) -> f64 {
    if let Some(&cached) = memo.get(&id) {
        return cached;
    }

    let mut deepest = 0.0_f64;
    for producer in graph.producers(id) {
        deepest = deepest.max(cumulative_cost(graph, producer, memo));
    }

    let total = graph.node(id).cost + deepest;
    memo.insert(id, total);
    total
}
