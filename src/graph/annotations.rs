//! Cost and annotation extraction from plan records.

use crate::explain::{CostInfo, Metric, TableAccess};

/// Pull a single cost figure out of an optional cost record.
///
/// Precedence: `query_cost`, then `read_cost`, then `prefix_cost`. The
/// first *present* field wins; if its value is corrupt it degrades to 0.0
/// rather than falling through to the next field. Returns 0.0 when the
/// record is absent or carries none of the three. `sort_cost` is never
/// consulted.
pub fn extract_cost(info: Option<&CostInfo>) -> f64 {
    let Some(info) = info else {
        return 0.0;
    };

    info.query_cost
        .as_ref()
        .or(info.read_cost.as_ref())
        .or(info.prefix_cost.as_ref())
        .map(Metric::as_cost)
        .unwrap_or(0.0)
}

/// Row estimate for a table node: rows examined per scan, falling back to
/// rows produced per join.
pub fn table_rows(table: &TableAccess) -> u64 {
    table
        .rows_examined_per_scan
        .as_ref()
        .or(table.rows_produced_per_join.as_ref())
        .map(Metric::as_rows)
        .unwrap_or(0)
}

/// Row factor a table contributes to a join's cross-product estimate:
/// rows produced per join, falling back to rows examined per scan.
pub fn join_row_factor(table: &TableAccess) -> u64 {
    table
        .rows_produced_per_join
        .as_ref()
        .or(table.rows_examined_per_scan.as_ref())
        .map(Metric::as_rows)
        .unwrap_or(0)
}

/// Derive the operational tags of a table-access record, in fixed
/// detection order. Absent flags contribute nothing; present tags keep
/// this order.
pub fn table_annotations(table: &TableAccess) -> Vec<String> {
    let mut tags = Vec::new();

    if table.using_index == Some(true) {
        tags.push("Using index".to_string());
    }
    if table.using_temporary_table == Some(true) {
        tags.push("Using temporary".to_string());
    }
    if table.using_filesort == Some(true) {
        tags.push("Using filesort".to_string());
    }
    if table.index_condition.is_some() {
        tags.push("Using index condition".to_string());
    }
    if let Some(message) = &table.message {
        tags.push(message.clone());
    }

    tags
}
