//! Renderer-facing output contract.
//!
//! A [`PlanView`] is everything a rendering layer needs: the node list in
//! discovery order (each node carrying its producers and position), the
//! producer→consumer edge list, and the aggregate total cost. Building one
//! runs the whole pipeline: entry validation → plan parsing → critical-path
//! marking → layout.

use serde::Serialize;

use crate::explain::{self, ExplainResult};
use crate::graph::{critical_path, PlanGraph, PlanNode, PlanParser};
use crate::layout::Layout;

/// One producer→consumer edge, by node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewEdge {
    pub from: usize,
    pub to: usize,
}

/// One node with its id, adjacency, and position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub id: usize,
    #[serde(flatten)]
    pub node: PlanNode,
    /// Ids of the nodes feeding this one, in attachment order.
    pub children: Vec<usize>,
    pub x: f64,
    pub y: f64,
}

/// The complete normalized graph handed to a rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
    /// Flat sum of every node's cost. Costs that recur across nested
    /// levels are summed again; see [`PlanGraph::total_cost`].
    pub total_cost: f64,
}

impl PlanView {
    /// Assemble the view from an annotated graph and its layout.
    pub fn assemble(graph: &PlanGraph, layout: &Layout) -> Self {
        let nodes = graph
            .nodes()
            .map(|(id, node)| {
                let position = layout.position(id);
                ViewNode {
                    id: id.index(),
                    node: node.clone(),
                    children: graph
                        .producers(id)
                        .into_iter()
                        .map(|p| p.index())
                        .collect(),
                    x: position.map(|p| p.x).unwrap_or(0.0),
                    y: position.map(|p| p.y).unwrap_or(0.0),
                }
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(from, to)| ViewEdge {
                from: from.index(),
                to: to.index(),
            })
            .collect();

        Self {
            nodes,
            edges,
            total_cost: graph.total_cost(),
        }
    }
}

/// Run the full pipeline over one `EXPLAIN FORMAT=JSON` buffer.
///
/// Synchronous and free of I/O; all state is allocated per call.
pub fn analyze(input: &str) -> ExplainResult<PlanView> {
    let block = explain::parse(input)?;
    let mut graph = PlanParser::parse(&block);
    critical_path::mark(&mut graph);
    let layout = Layout::compute(&graph);
    Ok(PlanView::assemble(&graph, &layout))
}
