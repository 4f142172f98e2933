//! Typed mirror of the `EXPLAIN FORMAT=JSON` plan tree.
//!
//! The source format is loosely unioned: any level may mix fields belonging
//! to different operation kinds, and numeric statistics arrive either as
//! JSON numbers or as decimal strings. Every field is therefore optional,
//! and each record keeps a flattened catch-all map so fields this schema
//! does not model still survive into the `raw` snapshots on parsed nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Lenient scalars
// ============================================================================

/// A numeric statistic as MySQL emits it: a JSON number, or a decimal
/// string such as `"10.50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    /// Plain JSON number.
    Number(f64),
    /// Decimal carried as a string (the usual form for cost figures).
    Text(String),
}

impl Metric {
    /// Numeric value as a non-negative cost.
    ///
    /// A present but non-numeric string is a corrupt field and degrades to
    /// 0.0 so one bad statistic cannot invalidate the rest of the subtree.
    pub fn as_cost(&self) -> f64 {
        match self {
            Metric::Number(n) if n.is_finite() => n.max(0.0),
            Metric::Number(_) => 0.0,
            Metric::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0).max(0.0),
        }
    }

    /// Numeric value as a non-negative row count, with the same
    /// degrade-to-zero treatment as [`Metric::as_cost`].
    pub fn as_rows(&self) -> u64 {
        let value = self.as_cost();
        if value >= u64::MAX as f64 {
            u64::MAX
        } else {
            value as u64
        }
    }
}

// ============================================================================
// Access methods
// ============================================================================

/// How a table access locates rows, ordered roughly worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum AccessType {
    /// Full table scan.
    #[serde(rename = "ALL")]
    All,
    /// Full index scan.
    #[serde(rename = "index")]
    Index,
    /// Index range scan.
    #[serde(rename = "range")]
    Range,
    /// Merge of several index range scans.
    #[serde(rename = "index_merge")]
    IndexMerge,
    /// Fulltext index lookup.
    #[serde(rename = "fulltext")]
    Fulltext,
    /// Ref lookup that also matches NULL.
    #[serde(rename = "ref_or_null")]
    RefOrNull,
    /// IN-subquery via non-unique index.
    #[serde(rename = "index_subquery")]
    IndexSubquery,
    /// IN-subquery via unique index.
    #[serde(rename = "unique_subquery")]
    UniqueSubquery,
    /// Non-unique index lookup.
    #[serde(rename = "ref")]
    Ref,
    /// Unique index lookup per joined row.
    #[serde(rename = "eq_ref")]
    EqRef,
    /// At most one matching row, read once.
    #[serde(rename = "const")]
    Const,
    /// Single-row system table.
    #[serde(rename = "system")]
    System,
    /// Classifier this schema does not recognize.
    #[serde(rename = "unknown")]
    Unknown,
}

impl From<String> for AccessType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ALL" => AccessType::All,
            "index" => AccessType::Index,
            "range" => AccessType::Range,
            "index_merge" => AccessType::IndexMerge,
            "fulltext" => AccessType::Fulltext,
            "ref_or_null" => AccessType::RefOrNull,
            "index_subquery" => AccessType::IndexSubquery,
            "unique_subquery" => AccessType::UniqueSubquery,
            "ref" => AccessType::Ref,
            "eq_ref" => AccessType::EqRef,
            "const" => AccessType::Const,
            "system" => AccessType::System,
            _ => AccessType::Unknown,
        }
    }
}

// ============================================================================
// Cost records
// ============================================================================

/// Per-record cost breakdown. Which fields are populated depends on the
/// record kind: query blocks carry `query_cost`, table accesses carry
/// `read_cost`/`eval_cost`/`prefix_cost`, ordering stages carry `sort_cost`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInfo {
    /// Aggregate cost of the whole block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_cost: Option<Metric>,
    /// Cost of reading the rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_cost: Option<Metric>,
    /// Cost of evaluating conditions on the rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_cost: Option<Metric>,
    /// Cumulative cost up to and including this table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_cost: Option<Metric>,
    /// Cost of the sort operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_cost: Option<Metric>,
    /// Bytes read per join.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_read_per_join: Option<Metric>,
}

// ============================================================================
// Table access
// ============================================================================

/// One table-access record: the leaf operation of the plan tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableAccess {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possible_keys: Option<Vec<String>>,
    /// Chosen index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Constituent parts of the chosen key, leftmost first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_key_parts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_length: Option<String>,
    /// Columns/constants compared against the key.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_examined_per_scan: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_produced_per_join: Option<Metric>,
    /// Percentage of examined rows surviving the table condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_columns: Option<Vec<String>>,
    /// Residual filter applied after the access method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_condition: Option<String>,
    /// Condition pushed down into the index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_condition: Option<String>,
    /// Covering-index read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_filesort: Option<bool>,
    /// Derived-table plan this access materializes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materialized_from_subquery: Option<Box<MaterializedSubquery>>,
    /// Subqueries correlated to this table's condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_subqueries: Option<Vec<SubqueryBlock>>,
    /// Terminal diagnostic in place of an access plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of a `nested_loop` join list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedLoopItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableAccess>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Plan block a derived table is materialized from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedSubquery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cacheable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_block: Option<Box<QueryBlock>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Stage records
// ============================================================================

/// ORDER BY stage. Nests a grouping stage, a join, or a bare table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderingOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_filesort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping_operation: Option<Box<GroupingOperation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_loop: Option<Vec<NestedLoopItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Box<TableAccess>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// GROUP BY stage. Nests a join, a bare table, or a buffering sub-stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupingOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_filesort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_result: Option<Box<BufferResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_loop: Option<Vec<NestedLoopItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Box<TableAccess>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// DISTINCT stage. Nests a join or a bare table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicatesRemoval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_filesort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_loop: Option<Vec<NestedLoopItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Box<TableAccess>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Row buffer between a join and a grouping stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BufferResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_loop: Option<Vec<NestedLoopItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Box<TableAccess>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// UNION stage combining several branch specifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_temporary_table: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_specifications: Option<Vec<QuerySpecification>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One branch of a union.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cacheable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_block: Option<Box<QueryBlock>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Correlated or uncorrelated subquery attached to a level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubqueryBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cacheable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_block: Option<Box<QueryBlock>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Query block
// ============================================================================

/// One level of the plan tree. The fields are not mutually exclusive in the
/// source format; the parser applies a fixed precedence when several stage
/// fields appear on the same level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Box<TableAccess>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_loop: Option<Vec<NestedLoopItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering_operation: Option<Box<OrderingOperation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping_operation: Option<Box<GroupingOperation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates_removal: Option<Box<DuplicatesRemoval>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub union_result: Option<Box<UnionResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_subqueries: Option<Vec<SubqueryBlock>>,
    /// Further nested plan block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_block: Option<Box<QueryBlock>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
