//! Entry validation for `EXPLAIN FORMAT=JSON` text.
//!
//! The boundary distinguishes two rejection reasons: text that is not
//! structured JSON at all, and JSON that lacks the top-level `query_block`
//! plan root. Everything past that boundary is lenient — unrecognized
//! sub-shapes inside the plan degrade instead of failing.

pub mod schema;

pub use schema::{
    AccessType, BufferResult, CostInfo, DuplicatesRemoval, GroupingOperation,
    MaterializedSubquery, Metric, NestedLoopItem, OrderingOperation, QueryBlock,
    QuerySpecification, SubqueryBlock, TableAccess, UnionResult,
};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur at the input boundary.
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Missing required field `query_block`")]
    MissingQueryBlock,
}

/// Result type for boundary operations.
pub type ExplainResult<T> = Result<T, ExplainError>;

/// Validate and deserialize one `EXPLAIN FORMAT=JSON` buffer.
///
/// Rejection happens before any plan parsing: either the text fails generic
/// JSON parsing ([`ExplainError::MalformedInput`]) or the parsed structure
/// has no top-level `query_block` ([`ExplainError::MissingQueryBlock`]).
/// No partial result is produced on rejection.
pub fn parse(input: &str) -> ExplainResult<QueryBlock> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| ExplainError::MalformedInput(e.to_string()))?;

    let root = value
        .as_object()
        .ok_or_else(|| ExplainError::MalformedInput("top level is not an object".to_string()))?;

    let block = root
        .get("query_block")
        .ok_or(ExplainError::MissingQueryBlock)?;

    serde_json::from_value(block.clone()).map_err(|e| ExplainError::MalformedInput(e.to_string()))
}
