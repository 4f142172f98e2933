//! # Planviz
//!
//! Normalizes `EXPLAIN FORMAT=JSON` query plans into renderable data-flow
//! graphs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            EXPLAIN FORMAT=JSON text buffer               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [explain: validation + schema]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Plan tree (nested QueryBlock)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [graph: recursive parser]
//! ┌─────────────────────────────────────────────────────────┐
//! │      PlanGraph (flat nodes, producer→consumer edges)     │
//! │             + critical-path annotation                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [layout: tidy tree]
//! ┌─────────────────────────────────────────────────────────┐
//! │        PlanView (nodes + edges + 2-D coordinates)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate stops at the [`view::PlanView`] contract; interactive
//! rendering, panning/zooming, and theming are external consumers.

pub mod explain;
pub mod graph;
pub mod layout;
pub mod view;

pub use explain::{AccessType, ExplainError, ExplainResult, QueryBlock};
pub use graph::{NodeId, NodeKind, PlanGraph, PlanNode, PlanParser};
pub use layout::{Layout, Point};
pub use view::{analyze, PlanView, ViewEdge, ViewNode};
