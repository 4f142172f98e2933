//! Recursive-descent transform from the nested plan tree to the flat graph.
//!
//! Each level of the input is classified into exactly one [`Shape`] and
//! handled by the first matching rule, in a fixed precedence: ordering →
//! grouping → duplicate removal → union → table access. Fields belonging
//! to a lower-precedence shape on the same level are only reachable through
//! the winning stage's own nesting contract, never re-processed
//! independently.
//!
//! Every handler receives an attachment point: the id of the node that
//! consumes this level's output, or `None` for a top-level root. Freshly
//! emitted nodes connect to their attachment point through
//! [`PlanGraph::feed`], which performs the containment→data-flow inversion.

use serde_json::Value;

use crate::explain::{
    BufferResult, DuplicatesRemoval, GroupingOperation, NestedLoopItem, OrderingOperation,
    QueryBlock, SubqueryBlock, TableAccess, UnionResult,
};
use crate::graph::annotations::{extract_cost, join_row_factor, table_annotations, table_rows};
use crate::graph::{NodeId, NodeKind, PlanGraph, PlanNode};

/// The recognized shapes of one plan-tree level, in dispatch precedence.
enum Shape<'a> {
    Ordering(&'a OrderingOperation),
    Grouping(&'a GroupingOperation),
    Dedup(&'a DuplicatesRemoval),
    Union(&'a UnionResult),
    /// Tables, joins, subqueries, nested blocks, or a bare message.
    Access,
}

impl<'a> Shape<'a> {
    fn of(block: &'a QueryBlock) -> Self {
        if let Some(op) = &block.ordering_operation {
            Shape::Ordering(op)
        } else if let Some(op) = &block.grouping_operation {
            Shape::Grouping(op)
        } else if let Some(op) = &block.duplicates_removal {
            Shape::Dedup(op)
        } else if let Some(op) = &block.union_result {
            Shape::Union(op)
        } else {
            Shape::Access
        }
    }
}

/// Converts one plan tree into a [`PlanGraph`].
///
/// The parser owns the graph it is building for the duration of one
/// [`PlanParser::parse`] call; node ids come from the graph itself, so
/// repeated or concurrent parses are fully isolated from each other.
pub struct PlanParser {
    graph: PlanGraph,
}

impl PlanParser {
    /// Parse a validated plan root into a normalized graph.
    pub fn parse(block: &QueryBlock) -> PlanGraph {
        let mut parser = Self {
            graph: PlanGraph::new(),
        };
        parser.query_block(block, None, NodeKind::Select);
        parser.graph
    }

    /// Dispatch one level by shape. `kind` is the level's designated node
    /// kind, used when the level degrades to a bare diagnostic message.
    /// Returns whether any node was emitted for this level.
    fn query_block(&mut self, block: &QueryBlock, attach: Option<NodeId>, kind: NodeKind) -> bool {
        match Shape::of(block) {
            Shape::Ordering(op) => {
                self.ordering(op, attach);
                true
            }
            Shape::Grouping(op) => {
                self.grouping(op, attach);
                true
            }
            Shape::Dedup(op) => {
                self.dedup(op, attach);
                true
            }
            Shape::Union(op) => {
                self.union(op, attach);
                true
            }
            Shape::Access => self.access_level(block, attach, kind),
        }
    }

    /// ORDER BY stage: emit a `sort` node and recurse into whatever the
    /// stage nests - a grouping stage, a join, or a bare table.
    fn ordering(&mut self, op: &OrderingOperation, attach: Option<NodeId>) {
        let mut node = PlanNode::new(NodeKind::Sort, "ORDER BY");
        node.cost = extract_cost(op.cost_info.as_ref());
        if op.using_filesort == Some(true) {
            node.tags.push("Using filesort".to_string());
        }
        if op.using_temporary_table == Some(true) {
            node.tags.push("Using temporary table".to_string());
        }
        node.raw = snapshot(op);
        let id = self.emit(node, attach);

        if let Some(group) = &op.grouping_operation {
            self.grouping(group, Some(id));
        } else {
            self.table_level(op.nested_loop.as_deref(), op.table.as_deref(), Some(id));
        }
    }

    /// GROUP BY stage: emit a `group` node and recurse into a join, a bare
    /// table, or a buffering sub-stage.
    fn grouping(&mut self, op: &GroupingOperation, attach: Option<NodeId>) {
        let mut node = PlanNode::new(NodeKind::Group, "GROUP BY");
        node.cost = extract_cost(op.cost_info.as_ref());
        if op.using_filesort == Some(true) {
            node.tags.push("Using filesort".to_string());
        }
        if op.using_temporary_table == Some(true) {
            node.tags.push("Using temporary table".to_string());
        }
        node.raw = snapshot(op);
        let id = self.emit(node, attach);

        if let Some(buffer) = &op.buffer_result {
            self.buffer(buffer, Some(id));
        } else {
            self.table_level(op.nested_loop.as_deref(), op.table.as_deref(), Some(id));
        }
    }

    /// DISTINCT stage: emit a `distinct` node and recurse into the nested
    /// join or table.
    fn dedup(&mut self, op: &DuplicatesRemoval, attach: Option<NodeId>) {
        let mut node = PlanNode::new(NodeKind::Distinct, "DISTINCT");
        node.cost = extract_cost(op.cost_info.as_ref());
        if op.using_filesort == Some(true) {
            node.tags.push("Using filesort".to_string());
        }
        if op.using_temporary_table == Some(true) {
            node.tags.push("Using temporary table".to_string());
        }
        node.raw = snapshot(op);
        let id = self.emit(node, attach);

        self.table_level(op.nested_loop.as_deref(), op.table.as_deref(), Some(id));
    }

    /// Buffering sub-stage between a join and its grouping consumer.
    fn buffer(&mut self, op: &BufferResult, attach: Option<NodeId>) {
        let mut node = PlanNode::new(NodeKind::Buffer, "Buffer Result");
        node.cost = extract_cost(op.cost_info.as_ref());
        if op.using_temporary_table == Some(true) {
            node.tags.push("Using temporary table".to_string());
        }
        node.raw = snapshot(op);
        let id = self.emit(node, attach);

        self.table_level(op.nested_loop.as_deref(), op.table.as_deref(), Some(id));
    }

    /// UNION stage: emit a `union` node and parse every branch
    /// specification's plan block left to right, each attaching to it.
    fn union(&mut self, op: &UnionResult, attach: Option<NodeId>) {
        let mut node = PlanNode::new(NodeKind::Union, "UNION");
        if op.using_temporary_table == Some(true) {
            node.tags.push("Using temporary table".to_string());
        }
        node.raw = snapshot(op);
        let id = self.emit(node, attach);

        for spec in op.query_specifications.iter().flatten() {
            if let Some(block) = &spec.query_block {
                self.query_block(block, Some(id), NodeKind::Select);
            }
        }
    }

    /// The lowest-precedence shape: a join or single table, any attached
    /// subqueries, a further nested plan block, and - only when nothing
    /// else emitted a node - a bare diagnostic message.
    fn access_level(&mut self, block: &QueryBlock, attach: Option<NodeId>, kind: NodeKind) -> bool {
        let mut produced =
            self.table_level(block.nested_loop.as_deref(), block.table.as_deref(), attach);

        for sub in block.attached_subqueries.iter().flatten() {
            produced |= self.subquery(sub, attach);
        }

        if let Some(inner) = &block.query_block {
            produced |= self.query_block(inner, attach, kind);
        }

        if !produced {
            if let Some(message) = &block.message {
                let mut node = PlanNode::new(kind, message.clone());
                node.raw = snapshot(block);
                self.emit(node, attach);
                produced = true;
            }
        }

        produced
    }

    /// Multi-way join or single-table handling.
    ///
    /// Two or more join entries produce one `join` node fed by a `table`
    /// node per entry; a single entry (or a bare table field) skips the
    /// join node and attaches the table directly.
    fn table_level(
        &mut self,
        nested_loop: Option<&[NestedLoopItem]>,
        table: Option<&TableAccess>,
        attach: Option<NodeId>,
    ) -> bool {
        let entries: Vec<&TableAccess> = nested_loop
            .into_iter()
            .flatten()
            .filter_map(|item| item.table.as_ref())
            .collect();

        if entries.len() >= 2 {
            let cost: f64 = entries
                .iter()
                .map(|t| extract_cost(t.cost_info.as_ref()))
                .sum();
            // Cross-product estimate, not a join-selectivity estimate.
            let rows = entries
                .iter()
                .fold(1u64, |acc, t| acc.saturating_mul(join_row_factor(t)));

            let mut node = PlanNode::new(NodeKind::Join, "Nested Loop Join");
            node.cost = cost;
            node.rows = rows;
            node.raw = snapshot(&nested_loop);
            let join_id = self.emit(node, attach);

            for entry in entries {
                self.table_node(entry, Some(join_id));
            }
            true
        } else if let Some(single) = entries.first().copied().or(table) {
            self.table_node(single, attach);
            true
        } else {
            false
        }
    }

    /// Emit one `table` node and recurse into its materialized plan block
    /// and attached subqueries, both feeding the table node.
    fn table_node(&mut self, table: &TableAccess, attach: Option<NodeId>) -> NodeId {
        let label = table
            .table_name
            .clone()
            .unwrap_or_else(|| "(unnamed)".to_string());
        let mut node = PlanNode::new(NodeKind::Table, label);
        node.cost = extract_cost(table.cost_info.as_ref());
        node.rows = table_rows(table);
        node.table = table.table_name.clone();
        node.access_type = table.access_type;
        node.key = table.key.clone();
        node.used_key_parts = table.used_key_parts.clone().unwrap_or_default();
        node.attached_condition = table.attached_condition.clone();
        node.tags = table_annotations(table);
        node.raw = snapshot(table);
        let id = self.emit(node, attach);

        if let Some(materialized) = &table.materialized_from_subquery {
            if let Some(inner) = &materialized.query_block {
                self.query_block(inner, Some(id), NodeKind::TempTable);
            }
        }
        for sub in table.attached_subqueries.iter().flatten() {
            self.subquery(sub, Some(id));
        }

        id
    }

    /// Attached subquery: its plan block becomes an independent subtree
    /// feeding the same attachment point, with `subquery` as the designated
    /// kind for message-only blocks.
    fn subquery(&mut self, sub: &SubqueryBlock, attach: Option<NodeId>) -> bool {
        match &sub.query_block {
            Some(block) => self.query_block(block, attach, NodeKind::Subquery),
            None => false,
        }
    }

    /// Add a node and connect it to its consumer, if any.
    fn emit(&mut self, node: PlanNode, attach: Option<NodeId>) -> NodeId {
        let id = self.graph.add_node(node);
        if let Some(consumer) = attach {
            self.graph.feed(id, consumer);
        }
        id
    }
}

/// Opaque snapshot of an originating sub-record.
fn snapshot<T: serde::Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_default()
}
