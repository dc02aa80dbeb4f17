//! Deletion algorithm + rebalance cascade
//!
//! Three structural cases at the target:
//!   leaf          -> slot becomes empty
//!   one child     -> child moves up
//!   two children  -> take the inorder successor's value, delete the successor
//!                    from the right subtree
//! Every surviving ancestor is then checked, and unlike insertion more than
//! one of them may rotate. The deleted value is gone by then, so the rotation
//! case is picked from the heavy child's balance (balance-relative tie-breaks).

use std::cmp::Ordering;
use std::sync::Arc;

use super::node::{balance, leftmost, Key, Link};
use super::rebalance;
use super::rotation::Rotation;
use crate::trace::recorder::{with_child, Recorder, Side};

enum Case<V> {
    Leaf,
    OneChild(Link<V>),
    TwoChildren(V),
}

/// Delete `value` below `link`, returning the new subtree root.
///
/// An absent value leaves the subtree as it was.
pub(crate) fn delete<V: Key>(
    link: Option<Link<V>>,
    value: V,
    recorder: &mut Recorder<V>,
) -> Option<Link<V>> {
    let mut node = link?;

    match value.cmp(&node.value) {
        Ordering::Less => {
            recorder.visit(&node, Side::Left);
            with_child(&mut node, Side::Left, recorder, |child, recorder| {
                delete(child, value, recorder)
            });
        }
        Ordering::Greater => {
            recorder.visit(&node, Side::Right);
            with_child(&mut node, Side::Right, recorder, |child, recorder| {
                delete(child, value, recorder)
            });
        }
        Ordering::Equal => {
            node = unlink(node, recorder)?;
        }
    }

    Some(rebalance(node, recorder, pick_rotation))
}

/// Remove the target node itself, returning what takes its place
fn unlink<V: Key>(mut node: Link<V>, recorder: &mut Recorder<V>) -> Option<Link<V>> {
    recorder.found(&node);

    let case = match (&node.left, &node.right) {
        (None, None) => Case::Leaf,
        (Some(child), None) | (None, Some(child)) => Case::OneChild(Arc::clone(child)),
        (Some(_), Some(right)) => Case::TwoChildren(leftmost(right)),
    };

    match case {
        Case::Leaf => {
            recorder.delete_leaf(&node);
            drop(node);
            recorder.deleted(None);
            None
        }
        Case::OneChild(child) => {
            recorder.delete_one_child(&node, child.value);
            drop(node);
            recorder.deleted(Some(&child));
            Some(child)
        }
        Case::TwoChildren(successor) => {
            recorder.delete_two_children(&node, successor);
            Arc::make_mut(&mut node).value = successor;
            with_child(&mut node, Side::Right, recorder, |child, recorder| {
                delete(child, successor, recorder)
            });
            Some(node)
        }
    }
}

fn pick_rotation<V: Key>(node: &Link<V>, factor: i32) -> Option<Rotation> {
    if factor > 1 {
        if balance(node.left.as_ref()) >= 0 {
            Some(Rotation::LL)
        } else {
            Some(Rotation::LR)
        }
    } else if factor < -1 {
        if balance(node.right.as_ref()) <= 0 {
            Some(Rotation::RR)
        } else {
            Some(Rotation::RL)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::insert::insert;
    use crate::trace::recorder::Operation;

    fn build(values: &[i32]) -> Option<Link<i32>> {
        let mut root = None;
        let mut next_id = 0;
        for &value in values {
            let mut recorder = Recorder::silent(Operation::Insert, value, next_id);
            root = Some(insert(root, value, &mut recorder));
            next_id = recorder.finish(None).0;
        }
        root
    }

    fn remove(root: Option<Link<i32>>, value: i32) -> Option<Link<i32>> {
        let mut recorder = Recorder::silent(Operation::Delete, value, 100);
        delete(root, value, &mut recorder)
    }

    fn inorder(link: Option<&Link<i32>>, out: &mut Vec<i32>) {
        if let Some(node) = link {
            inorder(node.left.as_ref(), out);
            out.push(node.value);
            inorder(node.right.as_ref(), out);
        }
    }

    fn values(root: Option<&Link<i32>>) -> Vec<i32> {
        let mut out = Vec::new();
        inorder(root, &mut out);
        out
    }

    #[test]
    fn test_delete_leaf() {
        let root = remove(build(&[20, 10, 30]), 10);
        assert_eq!(values(root.as_ref()), vec![20, 30]);
        assert_eq!(root.unwrap().height, 2);
    }

    #[test]
    fn test_delete_one_child_lifts_child() {
        let root = remove(build(&[20, 10, 30, 40]), 30);
        let root = root.unwrap();
        assert_eq!(root.right.as_ref().map(|n| n.value), Some(40));
        assert_eq!(values(Some(&root)), vec![10, 20, 40]);
    }

    #[test]
    fn test_delete_two_children_keeps_node_identity() {
        let root = build(&[20, 10, 30, 25, 40]);
        let root_id = root.as_ref().unwrap().id;
        let root = remove(root, 20).unwrap();

        assert_eq!(root.value, 25);
        assert_eq!(root.id, root_id);
        assert_eq!(values(Some(&root)), vec![10, 25, 30, 40]);
    }

    #[test]
    fn test_delete_triggers_rotation() {
        // removing 10 leaves 20 right-heavy with a right-leaning child: RR
        let root = remove(build(&[20, 10, 30, 40]), 10).unwrap();
        assert_eq!(root.value, 30);
        assert_eq!(root.balance(), 0);
    }

    #[test]
    fn test_delete_rebalances_multiple_levels() {
        // Fibonacci-shaped tree: deleting the shallow leaf cascades
        let root = build(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
        let root = remove(root, 12).unwrap();

        assert_eq!(values(Some(&root)), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        fn check(link: Option<&Link<i32>>) -> u32 {
            let Some(node) = link else { return 0 };
            let lh = check(node.left.as_ref());
            let rh = check(node.right.as_ref());
            assert!((lh as i32 - rh as i32).abs() <= 1, "unbalanced at {}", node.value);
            assert_eq!(node.height, 1 + lh.max(rh));
            node.height
        }
        check(Some(&root));
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let root = build(&[2, 1, 3]);
        let before = values(root.as_ref());
        let root = remove(root, 9);
        assert_eq!(values(root.as_ref()), before);
        assert!(remove(None, 1).is_none());
    }

    #[test]
    fn test_delete_leaves_shared_tree_untouched() {
        let root = build(&[20, 10, 30, 40]);
        let shared = root.clone();
        let _ = remove(root, 10);
        assert_eq!(values(shared.as_ref()), vec![10, 20, 30, 40]);
    }
}
