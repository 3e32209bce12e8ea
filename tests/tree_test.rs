//! Tests for OrgTree reparenting and traversal

use std::collections::HashSet;

use rstest::{fixture, rstest};

use orgchart::domain::{DomainError, NodeId, NodeRecord, OrgTree, ViewState};
use orgchart::util::testing;

fn id(value: impl Into<NodeId>) -> NodeId {
    value.into()
}

fn ids<T: Into<NodeId> + Copy>(values: &[T]) -> Vec<NodeId> {
    values.iter().map(|&v| v.into()).collect()
}

// DIRETORIA
// ├── 1
// │   ├── 12
// │   ├── 13
// │   └── 14
// │       ├── 45
// │       └── 46
// └── 2
#[fixture]
fn chart() -> OrgTree {
    testing::init_test_setup();
    let records = vec![
        NodeRecord::new("DIRETORIA", "DIRETORIA").with_subordinates([1, 2]),
        NodeRecord::new(1, "DIRETOR 1").with_subordinates([12, 13, 14]),
        NodeRecord::new(2, "DIRETOR 2"),
        NodeRecord::new(12, "Linda Newland"),
        NodeRecord::new(13, "Linda Newland"),
        NodeRecord::new(14, "Kaesyo").with_subordinates([45, 46]),
        NodeRecord::new(45, "Juniord"),
        NodeRecord::new(46, "Executive Assistant"),
    ];
    OrgTree::from_records(records, &id("DIRETORIA")).unwrap()
}

fn preorder(tree: &OrgTree) -> Vec<NodeId> {
    tree.iter().map(|n| n.id().clone()).collect()
}

fn subtree(tree: &OrgTree, start: &NodeId) -> HashSet<NodeId> {
    tree.traverse(start)
        .unwrap()
        .map(|n| n.id().clone())
        .collect()
}

// ============================================================
// Reparent
// ============================================================

#[rstest]
fn given_chart_when_moving_14_under_2_then_only_both_parents_change(mut chart: OrgTree) {
    let before = chart.clone();

    chart.reparent(&id(14), &id(2)).unwrap();

    assert_eq!(chart.children_of(&id(2)).unwrap(), vec![id(14)]);
    assert_eq!(chart.children_of(&id(1)).unwrap(), ids(&[12, 13]));
    assert_eq!(chart.children_of(&id(14)).unwrap(), ids(&[45, 46]));
    assert_eq!(chart.parent_of(&id(14)).unwrap(), Some(id(2)));
    for other in [id("DIRETORIA"), id(12), id(13), id(45), id(46)] {
        assert_eq!(
            chart.children_of(&other).unwrap(),
            before.children_of(&other).unwrap(),
            "children of {} must be unchanged",
            other
        );
    }
    chart.check_invariants().unwrap();
}

#[rstest]
fn given_chart_when_moving_ancestor_under_descendant_then_cycle(mut chart: OrgTree) {
    let result = chart.reparent(&id(1), &id(14));

    assert_eq!(
        result,
        Err(DomainError::Cycle {
            moved: id(1),
            target: id(14)
        })
    );
}

#[rstest]
fn given_chart_when_moving_node_under_itself_then_cycle(mut chart: OrgTree) {
    assert!(matches!(
        chart.reparent(&id(14), &id(14)),
        Err(DomainError::Cycle { .. })
    ));
}

#[rstest]
#[case(id("DIRETORIA"))]
#[case(id(1))]
#[case(id(46))]
#[case(id(999))]
fn given_root_when_moving_anywhere_then_invalid_operation(
    mut chart: OrgTree,
    #[case] target: NodeId,
) {
    assert_eq!(
        chart.reparent(&id("DIRETORIA"), &target),
        Err(DomainError::RootMove(id("DIRETORIA")))
    );
}

#[rstest]
#[case(id(999), id(2), id(999))]
#[case(id(14), id(999), id(999))]
#[case(id("14"), id(2), id("14"))]
fn given_unknown_id_when_moving_then_not_found(
    mut chart: OrgTree,
    #[case] moved: NodeId,
    #[case] target: NodeId,
    #[case] missing: NodeId,
) {
    assert_eq!(
        chart.reparent(&moved, &target),
        Err(DomainError::NotFound(missing))
    );
}

#[rstest]
#[case(id(1), id(14))]
#[case(id(14), id(14))]
#[case(id("DIRETORIA"), id(2))]
#[case(id(999), id(2))]
#[case(id(14), id(999))]
fn given_rejected_move_when_applied_then_tree_unchanged(
    mut chart: OrgTree,
    #[case] moved: NodeId,
    #[case] target: NodeId,
) {
    let before = chart.clone();

    assert!(chart.reparent(&moved, &target).is_err());

    assert_eq!(chart, before);
    chart.check_invariants().unwrap();
}

#[rstest]
fn given_move_when_repeated_then_same_tree_as_single_move(chart: OrgTree) {
    let once = chart.reparented(&id(12), &id(2)).unwrap();
    let twice = once.reparented(&id(12), &id(2)).unwrap();

    assert_eq!(once, twice);
}

#[rstest]
fn given_node_when_moved_under_current_parent_then_becomes_last_child(mut chart: OrgTree) {
    chart.reparent(&id(12), &id(1)).unwrap();

    assert_eq!(chart.children_of(&id(1)).unwrap(), ids(&[13, 14, 12]));
}

#[rstest]
fn given_node_with_subordinates_when_moved_under_root_then_keeps_subtree(mut chart: OrgTree) {
    chart.reparent(&id(14), &id("DIRETORIA")).unwrap();

    assert_eq!(
        chart.children_of(&id("DIRETORIA")).unwrap(),
        vec![id(1), id(2), id(14)]
    );
    assert_eq!(chart.children_of(&id(14)).unwrap(), ids(&[45, 46]));
    assert_eq!(chart.len(), 8);
    chart.check_invariants().unwrap();
}

#[rstest]
fn given_chart_when_reparented_copy_then_original_untouched(chart: OrgTree) {
    let moved = chart.reparented(&id(45), &id(2)).unwrap();

    assert_eq!(chart.parent_of(&id(45)).unwrap(), Some(id(14)));
    assert_eq!(moved.parent_of(&id(45)).unwrap(), Some(id(2)));
}

/// Every (moved, target) pair either succeeds with invariants intact or fails
/// with the error its position in the tree predicts.
#[rstest]
fn given_every_pair_when_moving_then_outcome_matches_tree_position(chart: OrgTree) {
    let all = preorder(&chart);
    let root = chart.root_id().clone();

    for moved in &all {
        for target in &all {
            let result = chart.reparented(moved, target);

            if *moved == root {
                assert_eq!(result, Err(DomainError::RootMove(moved.clone())));
                continue;
            }
            if subtree(&chart, moved).contains(target) {
                assert!(
                    matches!(result, Err(DomainError::Cycle { .. })),
                    "{} -> {} should be a cycle",
                    moved,
                    target
                );
                continue;
            }

            let next = result.unwrap_or_else(|e| panic!("{} -> {} failed: {}", moved, target, e));
            next.check_invariants().unwrap();
            assert_eq!(next.len(), chart.len());
            assert_eq!(next.parent_of(moved).unwrap().as_ref(), Some(target));
            assert_eq!(next.children_of(target).unwrap().last(), Some(moved));
            let old_parent = chart.parent_of(moved).unwrap().unwrap();
            if old_parent != *target {
                assert!(!next.children_of(&old_parent).unwrap().contains(moved));
            }
            assert_eq!(
                subtree(&next, moved),
                subtree(&chart, moved),
                "moved subtree travels along"
            );
        }
    }
}

#[test]
fn given_deep_chain_when_moving_any_ancestor_below_descendant_then_cycle() {
    let depth = 6;
    let records: Vec<NodeRecord> = (0..depth)
        .map(|level| {
            let record = NodeRecord::new(level, format!("level {}", level));
            if level + 1 < depth {
                record.with_subordinates([level + 1])
            } else {
                record
            }
        })
        .collect();
    let tree = OrgTree::from_records(records, &id(0)).unwrap();
    assert_eq!(tree.depth(), 6);

    for ancestor in 1..depth {
        for descendant in (ancestor + 1)..depth {
            assert!(
                matches!(
                    tree.reparented(&id(ancestor), &id(descendant)),
                    Err(DomainError::Cycle { .. })
                ),
                "{} under {} must be rejected",
                ancestor,
                descendant
            );
        }
    }
}

/// Straight line of command: 0 manages 1, 1 manages 2, ...
fn chain(len: i64) -> OrgTree {
    let records: Vec<NodeRecord> = (0..len)
        .map(|level| {
            let record = NodeRecord::new(level, format!("level {}", level));
            if level + 1 < len {
                record.with_subordinates([level + 1])
            } else {
                record
            }
        })
        .collect();
    OrgTree::from_records(records, &id(0)).unwrap()
}

#[test]
fn given_very_deep_chain_when_measuring_and_moving_then_no_stack_exhaustion() {
    let len = 100_000;
    let mut tree = chain(len);

    assert_eq!(tree.depth(), 100_000);
    assert_eq!(tree.traverse(&id(0)).unwrap().count(), 100_000);
    assert_eq!(tree.traverse_postorder(&id(0)).unwrap().count(), 100_000);
    tree.check_invariants().unwrap();

    assert!(matches!(
        tree.reparent(&id(1), &id(len - 1)),
        Err(DomainError::Cycle { .. })
    ));
    tree.reparent(&id(len - 1), &id(0)).unwrap();

    assert_eq!(tree.depth(), 99_999);
    assert_eq!(tree.children_of(&id(0)).unwrap(), vec![id(1), id(len - 1)]);
}

// ============================================================
// Traversal
// ============================================================

#[rstest]
fn given_chart_when_traversing_from_root_then_preorder_visits_each_once(chart: OrgTree) {
    let visited = preorder(&chart);

    assert_eq!(
        visited,
        vec![
            id("DIRETORIA"),
            id(1),
            id(12),
            id(13),
            id(14),
            id(45),
            id(46),
            id(2)
        ]
    );
    let unique: HashSet<_> = visited.iter().collect();
    assert_eq!(unique.len(), chart.len());
}

#[rstest]
fn given_unchanged_chart_when_traversing_twice_then_same_sequence(chart: OrgTree) {
    let first: Vec<_> = chart.traverse(&id(1)).unwrap().map(|n| n.id().clone()).collect();
    let second: Vec<_> = chart.traverse(&id(1)).unwrap().map(|n| n.id().clone()).collect();

    assert_eq!(first, second);
    assert_eq!(first, ids(&[1, 12, 13, 14, 45, 46]));
}

#[rstest]
fn given_move_when_traversing_then_reflects_new_position(mut chart: OrgTree) {
    chart.reparent(&id(14), &id(2)).unwrap();

    assert_eq!(
        preorder(&chart),
        vec![
            id("DIRETORIA"),
            id(1),
            id(12),
            id(13),
            id(2),
            id(14),
            id(45),
            id(46)
        ]
    );
}

#[rstest]
fn given_unknown_start_when_traversing_then_not_found(chart: OrgTree) {
    assert!(matches!(
        chart.traverse(&id(77)),
        Err(DomainError::NotFound(_))
    ));
}

#[rstest]
fn given_chart_when_traversing_postorder_then_subordinates_come_first(chart: OrgTree) {
    let visited: Vec<_> = chart
        .traverse_postorder(&id("DIRETORIA"))
        .unwrap()
        .map(|n| n.id().clone())
        .collect();

    assert_eq!(
        visited,
        vec![
            id(12),
            id(13),
            id(45),
            id(46),
            id(14),
            id(1),
            id(2),
            id("DIRETORIA")
        ]
    );
}

#[rstest]
fn given_collapsed_node_when_traversing_visible_then_skips_its_subtree(chart: OrgTree) {
    let mut view = ViewState::new();
    view.toggle_collapse(&id(14));

    let visible: Vec<_> = chart
        .traverse_visible(&id("DIRETORIA"), &view)
        .unwrap()
        .map(|n| n.id().clone())
        .collect();

    assert_eq!(
        visible,
        vec![id("DIRETORIA"), id(1), id(12), id(13), id(14), id(2)]
    );
    assert_eq!(preorder(&chart).len(), 8, "full traversal ignores view state");
}

// ============================================================
// Queries and export
// ============================================================

#[rstest]
fn given_chart_when_querying_then_reports_structure(chart: OrgTree) {
    assert_eq!(chart.root_id(), &id("DIRETORIA"));
    assert!(chart.root().is_root());
    assert_eq!(chart.len(), 8);
    assert!(!chart.is_empty());
    assert_eq!(chart.depth(), 4);
    assert_eq!(chart.leaf_ids(), ids(&[12, 13, 45, 46, 2]));
    assert_eq!(chart.subordinate_count(&id(1)).unwrap(), 3);
    assert_eq!(chart.parent_of(&id("DIRETORIA")).unwrap(), None);
    assert!(chart.is_descendant(&id(46), &id(1)).unwrap());
    assert!(!chart.is_descendant(&id(1), &id(46)).unwrap());
    assert!(!chart.is_descendant(&id(1), &id(1)).unwrap());

    let kaesyo = chart.get(&id(14)).unwrap();
    assert_eq!(kaesyo.name(), "Kaesyo");
    assert_eq!(kaesyo.parent().map(|p| p.id().clone()), Some(id(1)));
    assert_eq!(kaesyo.child_ids(), ids(&[45, 46]));
}

#[rstest]
fn given_moved_chart_when_exporting_records_then_rebuilds_equal_tree(mut chart: OrgTree) {
    chart.reparent(&id(14), &id(2)).unwrap();
    chart.reparent(&id(12), &id(45)).unwrap();

    let records = chart.to_records();
    assert_eq!(records[0].id, id("DIRETORIA"));

    let rebuilt = OrgTree::from_records(records, chart.root_id()).unwrap();
    assert_eq!(rebuilt, chart);
}
