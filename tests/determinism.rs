use std::collections::HashSet;

use avl_trace::{build_tree, record_deletion, record_insertion};

use test_helpers::*;

#[test]
fn recorded_deletion_is_deterministic() {
    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let (_, trace) = record_deletion(&scenario_tree(), 30);
        fingerprints.insert(trace.fingerprint());
    }
    assert_eq!(fingerprints.len(), 1, "traces diverged across runs");
}

#[test]
fn structurally_equal_trees_give_pairwise_equal_steps() {
    // Same shape, different insertion order (and therefore different node ids)
    let a = build_tree([20, 10, 30, 5, 15, 25, 40, 35]);
    let b = build_tree([20, 30, 10, 40, 25, 15, 5, 35]);
    assert_eq!(a, b);

    for target in [5, 20, 30, 40] {
        let (after_a, trace_a) = record_deletion(&a, target);
        let (after_b, trace_b) = record_deletion(&b, target);

        assert_eq!(after_a, after_b);
        assert_eq!(trace_a.len(), trace_b.len(), "deleting {target}");
        for (left, right) in trace_a.iter().zip(trace_b.iter()) {
            assert_eq!(left.kind, right.kind);
            assert_eq!(left.current_value, right.current_value);
            assert_eq!(left.rotation_type, right.rotation_type);
            assert_eq!(left.tree, right.tree);
        }
        assert_eq!(trace_a.fingerprint(), trace_b.fingerprint());
    }
}

#[test]
fn node_ids_are_sequential_and_stable() {
    let tree = build_tree([2i64, 1, 3]);
    let root = tree.root().expect("non-empty");
    assert_eq!(root.id().0, 0);
    assert_eq!(root.left().map(|node| node.id().0), Some(1));
    assert_eq!(root.right().map(|node| node.id().0), Some(2));

    let (grown, _) = record_insertion(&tree, 4);
    let (again, _) = record_insertion(&tree, 4);
    let id_of = |tree: &avl_trace::AvlTree<i64>| {
        tree.root()
            .and_then(|root| root.right())
            .and_then(|node| node.right())
            .map(|node| node.id().0)
    };
    assert_eq!(id_of(&grown), Some(3));
    assert_eq!(id_of(&again), Some(3));
}
