use planviz::explain::QueryBlock;
use planviz::graph::{critical_path, NodeKind, PlanGraph, PlanParser};
use serde_json::json;

fn annotated(value: serde_json::Value) -> PlanGraph {
    let block: QueryBlock = serde_json::from_value(value["query_block"].clone()).unwrap();
    let mut graph = PlanParser::parse(&block);
    critical_path::mark(&mut graph);
    graph
}

#[test]
fn expensive_join_branch_is_marked() {
    let graph = annotated(json!({
        "query_block": {
            "nested_loop": [
                { "table": { "table_name": "cheap", "access_type": "const",
                             "cost_info": { "read_cost": "1.00" } } },
                { "table": { "table_name": "expensive", "access_type": "ALL",
                             "cost_info": { "read_cost": "500.00" } } }
            ]
        }
    }));

    for (_, node) in graph.nodes() {
        match node.label.as_str() {
            "Nested Loop Join" | "expensive" => assert!(node.is_critical_path, "{}", node.label),
            "cheap" => assert!(!node.is_critical_path),
            other => panic!("unexpected node {other}"),
        }
    }
}

#[test]
fn exactly_one_connected_path_is_marked() {
    let graph = annotated(json!({
        "query_block": {
            "ordering_operation": {
                "using_filesort": true,
                "nested_loop": [
                    { "table": { "table_name": "a", "access_type": "ALL",
                                 "cost_info": { "read_cost": "10.00" } } },
                    { "table": { "table_name": "b", "access_type": "ALL",
                                 "cost_info": { "read_cost": "20.00" } } },
                    { "table": { "table_name": "c", "access_type": "ALL",
                                 "cost_info": { "read_cost": "15.00" } } }
                ]
            }
        }
    }));

    // Path must be sort → join → b: one marked node per depth.
    let marked: Vec<&str> = graph
        .nodes()
        .filter(|(_, n)| n.is_critical_path)
        .map(|(_, n)| n.label.as_str())
        .collect();
    assert_eq!(marked, vec!["ORDER BY", "Nested Loop Join", "b"]);
}

#[test]
fn only_the_globally_best_root_is_marked() {
    // A table with an attached subquery at the top level yields two roots.
    let graph = annotated(json!({
        "query_block": {
            "table": { "table_name": "main_t", "access_type": "ALL",
                       "cost_info": { "read_cost": "2.00" } },
            "attached_subqueries": [
                { "query_block": {
                    "table": { "table_name": "sub_t", "access_type": "ALL",
                               "cost_info": { "read_cost": "40.00" } }
                }}
            ]
        }
    }));

    assert_eq!(graph.roots().len(), 2);

    let marked: Vec<&str> = graph
        .nodes()
        .filter(|(_, n)| n.is_critical_path)
        .map(|(_, n)| n.label.as_str())
        .collect();
    assert_eq!(marked, vec!["sub_t"]);
}

#[test]
fn cost_ties_break_toward_first_producer() {
    let graph = annotated(json!({
        "query_block": {
            "nested_loop": [
                { "table": { "table_name": "first", "access_type": "ALL",
                             "cost_info": { "read_cost": "10.00" } } },
                { "table": { "table_name": "second", "access_type": "ALL",
                             "cost_info": { "read_cost": "10.00" } } }
            ]
        }
    }));

    let marked: Vec<&str> = graph
        .nodes()
        .filter(|(_, n)| n.is_critical_path)
        .map(|(_, n)| n.label.as_str())
        .collect();
    assert_eq!(marked, vec!["Nested Loop Join", "first"]);
}

#[test]
fn empty_graph_marks_nothing() {
    let graph = annotated(json!({ "query_block": {} }));
    assert!(graph.is_empty());
}

#[test]
fn cumulative_cost_spans_stage_chains() {
    // sort(1) → group(1) → table(100): the whole chain is the path.
    let graph = annotated(json!({
        "query_block": {
            "ordering_operation": {
                "cost_info": { "sort_cost": "1.00" },
                "grouping_operation": {
                    "table": { "table_name": "big", "access_type": "ALL",
                               "cost_info": { "read_cost": "100.00" } }
                }
            }
        }
    }));

    let marked: Vec<NodeKind> = graph
        .nodes()
        .filter(|(_, n)| n.is_critical_path)
        .map(|(_, n)| n.kind)
        .collect();
    assert_eq!(
        marked,
        vec![NodeKind::Sort, NodeKind::Group, NodeKind::Table]
    );
}
