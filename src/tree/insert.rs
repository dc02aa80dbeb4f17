//! Insertion algorithm
//!
//! Recursive BST insert, then rebalance on the way back up.
//! The inserted value is known, so the rotation case is picked by comparing
//! it against the heavy child (value-relative tie-breaks).

use std::cmp::Ordering;
use std::sync::Arc;

use super::node::{Key, Link, Node};
use super::rebalance;
use super::rotation::Rotation;
use crate::trace::recorder::{with_child, Recorder, Side};

/// Insert `value` below `link`, returning the new subtree root.
///
/// A value already present is left alone: the existing node is returned.
pub(crate) fn insert<V: Key>(
    link: Option<Link<V>>,
    value: V,
    recorder: &mut Recorder<V>,
) -> Link<V> {
    let Some(mut node) = link else {
        let leaf = Arc::new(Node::leaf(recorder.issue_id(), value));
        recorder.inserted(&leaf);
        return leaf;
    };

    match value.cmp(&node.value) {
        Ordering::Less => {
            recorder.visit(&node, Side::Left);
            with_child(&mut node, Side::Left, recorder, |child, recorder| {
                Some(insert(child, value, recorder))
            });
        }
        Ordering::Greater => {
            recorder.visit(&node, Side::Right);
            with_child(&mut node, Side::Right, recorder, |child, recorder| {
                Some(insert(child, value, recorder))
            });
        }
        Ordering::Equal => {
            recorder.duplicate(&node);
            return node;
        }
    }

    // Every ancestor is checked; at most one of them actually rotates.
    rebalance(node, recorder, |node, factor| pick_rotation(node, factor, value))
}

fn pick_rotation<V: Key>(node: &Link<V>, factor: i32, inserted: V) -> Option<Rotation> {
    if factor > 1 && inserted < heavy_value(node.left.as_ref()) {
        Some(Rotation::LL)
    } else if factor < -1 && inserted > heavy_value(node.right.as_ref()) {
        Some(Rotation::RR)
    } else if factor > 1 && inserted >= heavy_value(node.left.as_ref()) {
        Some(Rotation::LR)
    } else if factor < -1 && inserted <= heavy_value(node.right.as_ref()) {
        Some(Rotation::RL)
    } else {
        None
    }
}

fn heavy_value<V: Key>(child: Option<&Link<V>>) -> V {
    match child {
        Some(child) => child.value,
        None => panic!("invariant violation: unbalanced node is missing its heavy child"),
    }
}
