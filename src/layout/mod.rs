//! Tidy tree layout - deterministic 2-D positions for every plan node.
//!
//! Two passes per root: a post-order pass computes each node's required
//! subtree width, then a pre-order pass centers every node over the span
//! its width reserved and packs its producers left to right from the span's
//! left edge. Producers sit one row above their consumer, so the pixel-space
//! y grows along every producer→consumer edge and the visual flow reads as
//! data aggregating downward.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::{NodeId, PlanGraph};

/// Horizontal space reserved for a single node.
pub const NODE_WIDTH: f64 = 160.0;
/// Gap between sibling subtrees.
pub const NODE_GAP: f64 = 40.0;
/// Vertical distance per edge hop.
pub const ROW_HEIGHT: f64 = 110.0;

/// Center position of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Computed positions for a whole graph.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    positions: HashMap<NodeId, Point>,
}

impl Layout {
    /// Lay out every node of the graph.
    ///
    /// Disconnected roots are placed left to right with double spacing
    /// between their subtrees. Nodes the traversal never reaches are
    /// stacked vertically to the right of the main span so nothing
    /// silently disappears.
    pub fn compute(graph: &PlanGraph) -> Self {
        let mut engine = Engine {
            graph,
            widths: HashMap::new(),
            positions: HashMap::new(),
        };

        let mut cursor = 0.0;
        for root in graph.roots() {
            let width = engine.measure(root);
            let base_y = (engine.height(root).saturating_sub(1)) as f64 * ROW_HEIGHT;
            engine.place(root, cursor, base_y);
            cursor += width + 2.0 * NODE_GAP;
        }

        // Fallback stack for anything the root walk missed.
        let mut fallback_y = 0.0;
        for (id, _) in graph.nodes() {
            if !engine.positions.contains_key(&id) {
                engine.positions.insert(
                    id,
                    Point {
                        x: cursor + NODE_WIDTH / 2.0,
                        y: fallback_y,
                    },
                );
                fallback_y += ROW_HEIGHT;
            }
        }

        Self {
            positions: engine.positions,
        }
    }

    /// Position of one node. Every node of the graph the layout was
    /// computed for has one.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

struct Engine<'a> {
    graph: &'a PlanGraph,
    widths: HashMap<NodeId, f64>,
    positions: HashMap<NodeId, Point>,
}

impl Engine<'_> {
    /// Post-order subtree width: a leaf takes one node width; an internal
    /// node takes the larger of one node width and the packed width of its
    /// producers.
    fn measure(&mut self, id: NodeId) -> f64 {
        if let Some(&width) = self.widths.get(&id) {
            return width;
        }

        let producers = self.graph.producers(id);
        let width = if producers.is_empty() {
            NODE_WIDTH
        } else {
            let mut sum = 0.0;
            for producer in &producers {
                sum += self.measure(*producer);
            }
            sum += NODE_GAP * (producers.len() - 1) as f64;
            sum.max(NODE_WIDTH)
        };

        self.widths.insert(id, width);
        width
    }

    /// Longest producer chain below a node, in nodes.
    fn height(&self, id: NodeId) -> usize {
        1 + self
            .graph
            .producers(id)
            .into_iter()
            .map(|producer| self.height(producer))
            .max()
            .unwrap_or(0)
    }

    /// Pre-order placement: center the node over its reserved span, then
    /// distribute producers from the span's left edge, one row up.
    fn place(&mut self, id: NodeId, left: f64, y: f64) {
        let width = self.widths.get(&id).copied().unwrap_or(NODE_WIDTH);
        self.positions.insert(
            id,
            Point {
                x: left + width / 2.0,
                y,
            },
        );

        let mut child_left = left;
        for producer in self.graph.producers(id) {
            let child_width = self.widths.get(&producer).copied().unwrap_or(NODE_WIDTH);
            self.place(producer, child_left, y - ROW_HEIGHT);
            child_left += child_width + NODE_GAP;
        }
    }
}
