//! Normalized plan graph - flat node/edge representation of a plan tree.
//!
//! The parser reduces every operation in the nested input tree to one
//! [`PlanNode`] and connects nodes with producer→consumer edges: a table
//! scan feeding a join points *to* the join. This is the reverse of the
//! input's containment direction, and the inversion happens in exactly one
//! place, [`PlanGraph::feed`].

pub mod annotations;
pub mod critical_path;
pub mod parser;

pub use parser::PlanParser;

use crate::explain::AccessType;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use serde_json::Value;

/// Identifier of a node within one parse. Ids are assigned in discovery
/// order (pre-order over the recursive descent) and are only meaningful
/// inside the graph that allocated them.
pub type NodeId = NodeIndex;

/// The operation a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Bare SELECT level (only materializes for diagnostic messages).
    Select,
    /// Table access.
    Table,
    /// Nested-loop join over two or more tables.
    Join,
    /// ORDER BY stage.
    Sort,
    /// GROUP BY stage.
    Group,
    /// DISTINCT stage.
    Distinct,
    /// UNION combining branch plans.
    Union,
    /// Attached subquery level.
    Subquery,
    /// Materialized temporary table level.
    TempTable,
    /// Row buffer between a join and a grouping stage.
    Buffer,
}

/// One normalized plan operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    pub kind: NodeKind,
    /// Display string: table name, fixed operation name, or a verbatim
    /// diagnostic message.
    pub label: String,
    /// Extracted cost; 0 when the source supplied none.
    pub cost: f64,
    /// Row estimate; 0 when the source supplied none.
    pub rows: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub used_key_parts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_condition: Option<String>,
    /// Annotation tags in detection order, not deduplicated.
    pub tags: Vec<String>,
    pub is_critical_path: bool,
    /// Snapshot of the originating sub-record, for downstream inspection
    /// only - never interpreted here.
    pub raw: Value,
}

impl PlanNode {
    /// Minimal node of the given kind; the parser fills in the rest.
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            cost: 0.0,
            rows: 0,
            table: None,
            access_type: None,
            key: None,
            used_key_parts: Vec::new(),
            attached_condition: None,
            tags: Vec::new(),
            is_critical_path: false,
            raw: Value::Null,
        }
    }
}

/// The normalized plan graph.
///
/// Wraps a directed graph whose node indices double as the stable node ids
/// of one parse: indices are handed out in insertion order and nothing is
/// ever removed, so discovery order, id order, and emission order coincide.
/// Each parse owns its own graph, which also makes the graph the per-call
/// id allocator - no state survives across parses.
#[derive(Debug, Clone, Default)]
pub struct PlanGraph {
    graph: DiGraph<PlanNode, ()>,
}

impl PlanGraph {
    /// Create a new empty plan graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
        }
    }

    /// Add a node, returning the id assigned in discovery order.
    pub fn add_node(&mut self, node: PlanNode) -> NodeId {
        self.graph.add_node(node)
    }

    /// Connect a producer to the consumer it feeds data into.
    ///
    /// This is the single place where the input tree's "parent contains
    /// child" nesting is inverted into a data-flow edge: the contained
    /// operation produces rows, the containing operation consumes them.
    pub fn feed(&mut self, producer: NodeId, consumer: NodeId) {
        self.graph.add_edge(producer, consumer, ());
    }

    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.graph[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut PlanNode {
        &mut self.graph[id]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All nodes with their ids, in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PlanNode)> {
        self.graph
            .node_indices()
            .map(move |id| (id, &self.graph[id]))
    }

    /// All producer→consumer edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target()))
    }

    /// The producers feeding a node, in attachment order.
    ///
    /// petgraph walks incoming neighbors newest-first, so the walk is
    /// reversed to recover the order the parser attached them in. Critical
    /// path tie-breaking and sibling layout both depend on this order.
    pub fn producers(&self, id: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .graph
            .neighbors_directed(id, Direction::Incoming)
            .collect();
        out.reverse();
        out
    }

    /// Root nodes: those feeding nothing, in discovery order. A parse can
    /// produce more than one root (e.g. independently attached subtrees).
    pub fn roots(&self) -> Vec<NodeId> {
        self.graph.externals(Direction::Outgoing).collect()
    }

    /// Flat sum of every node's cost.
    ///
    /// Nested stages repeat cost that their inputs already account for, so
    /// the sum double-counts across levels. That matches the behavior of
    /// the source format's aggregate figures and is kept as-is.
    pub fn total_cost(&self) -> f64 {
        self.graph.node_weights().map(|n| n.cost).sum()
    }

    /// Access the underlying petgraph structure.
    pub fn graph(&self) -> &DiGraph<PlanNode, ()> {
        &self.graph
    }
}
