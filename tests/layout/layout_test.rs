use planviz::explain::QueryBlock;
use planviz::graph::{PlanGraph, PlanParser};
use planviz::layout::{Layout, NODE_GAP, NODE_WIDTH, ROW_HEIGHT};
use serde_json::json;

fn parse(value: serde_json::Value) -> PlanGraph {
    let block: QueryBlock = serde_json::from_value(value["query_block"].clone()).unwrap();
    PlanParser::parse(&block)
}

fn wide_join() -> PlanGraph {
    parse(json!({
        "query_block": {
            "ordering_operation": {
                "using_filesort": true,
                "nested_loop": [
                    { "table": { "table_name": "a", "access_type": "ALL" } },
                    { "table": { "table_name": "b", "access_type": "ref" } },
                    { "table": { "table_name": "c", "access_type": "eq_ref" } }
                ]
            }
        }
    }))
}

#[test]
fn every_node_gets_a_position() {
    let graph = wide_join();
    let layout = Layout::compute(&graph);
    assert_eq!(layout.len(), graph.node_count());
    for (id, _) in graph.nodes() {
        assert!(layout.position(id).is_some());
    }
}

#[test]
fn consumers_sit_strictly_below_their_producers() {
    let graph = wide_join();
    let layout = Layout::compute(&graph);

    for (producer, consumer) in graph.edges() {
        let p = layout.position(producer).unwrap();
        let c = layout.position(consumer).unwrap();
        assert!(
            c.y > p.y,
            "consumer y {} must exceed producer y {}",
            c.y,
            p.y
        );
        assert_eq!(c.y - p.y, ROW_HEIGHT);
    }
}

#[test]
fn siblings_do_not_overlap() {
    let graph = wide_join();
    let layout = Layout::compute(&graph);

    // Collect spans per depth and check pairwise disjointness.
    let mut by_depth: Vec<(f64, f64)> = Vec::new();
    for (id, _) in graph.nodes() {
        let p = layout.position(id).unwrap();
        by_depth.push((p.y, p.x));
    }
    for i in 0..by_depth.len() {
        for j in (i + 1)..by_depth.len() {
            let (y1, x1) = by_depth[i];
            let (y2, x2) = by_depth[j];
            if y1 == y2 {
                assert!(
                    (x1 - x2).abs() >= NODE_WIDTH,
                    "nodes at depth {y1} overlap: {x1} vs {x2}"
                );
            }
        }
    }
}

#[test]
fn parent_is_centered_over_its_children() {
    let graph = wide_join();
    let layout = Layout::compute(&graph);

    // The join feeds the sort and is fed by three tables.
    let (sort_id, _) = graph.nodes().next().unwrap();
    let join_id = graph.producers(sort_id)[0];
    let tables = graph.producers(join_id);
    assert_eq!(tables.len(), 3);

    let join_x = layout.position(join_id).unwrap().x;
    let first_x = layout.position(tables[0]).unwrap().x;
    let last_x = layout.position(tables[2]).unwrap().x;
    let center = (first_x + last_x) / 2.0;
    assert!((join_x - center).abs() < 1e-9);
}

#[test]
fn tables_pack_left_to_right_with_fixed_gaps() {
    let graph = wide_join();
    let layout = Layout::compute(&graph);

    let (sort_id, _) = graph.nodes().next().unwrap();
    let join_id = graph.producers(sort_id)[0];
    let tables = graph.producers(join_id);

    let xs: Vec<f64> = tables
        .iter()
        .map(|id| layout.position(*id).unwrap().x)
        .collect();
    assert!(xs[0] < xs[1] && xs[1] < xs[2]);
    assert_eq!(xs[1] - xs[0], NODE_WIDTH + NODE_GAP);
    assert_eq!(xs[2] - xs[1], NODE_WIDTH + NODE_GAP);
}

#[test]
fn disconnected_roots_get_double_spacing() {
    // Top-level table plus attached subquery: two independent roots.
    let graph = parse(json!({
        "query_block": {
            "table": { "table_name": "main_t", "access_type": "ALL" },
            "attached_subqueries": [
                { "query_block": {
                    "table": { "table_name": "sub_t", "access_type": "ALL" }
                }}
            ]
        }
    }));
    let roots = graph.roots();
    assert_eq!(roots.len(), 2);

    let layout = Layout::compute(&graph);
    let first = layout.position(roots[0]).unwrap();
    let second = layout.position(roots[1]).unwrap();
    assert_eq!(second.x - first.x, NODE_WIDTH + 2.0 * NODE_GAP);
}

#[test]
fn layout_is_deterministic() {
    let graph = wide_join();
    let a = Layout::compute(&graph);
    let b = Layout::compute(&graph);
    for (id, _) in graph.nodes() {
        assert_eq!(a.position(id), b.position(id));
    }
}

#[test]
fn deep_chain_keeps_leaf_at_top() {
    let graph = parse(json!({
        "query_block": {
            "ordering_operation": {
                "grouping_operation": {
                    "table": { "table_name": "t", "access_type": "ALL" }
                }
            }
        }
    }));
    let layout = Layout::compute(&graph);

    let (sort_id, _) = graph.nodes().next().unwrap();
    let group_id = graph.producers(sort_id)[0];
    let table_id = graph.producers(group_id)[0];

    assert_eq!(layout.position(table_id).unwrap().y, 0.0);
    assert_eq!(layout.position(group_id).unwrap().y, ROW_HEIGHT);
    assert_eq!(layout.position(sort_id).unwrap().y, 2.0 * ROW_HEIGHT);
}
