//! Rotation primitives
//!
//! Two O(1) transforms, everything else composes from them:
//!
//! ```text
//!        y                x
//!       / \    right     / \
//!      x   C   ----->   A   y
//!     / \      <-----      / \
//!    A   T2     left      T2  C
//! ```
//!
//! Inorder sequence is preserved; only two child links and two heights change.

use std::fmt;
use std::sync::Arc;

use super::node::{Key, Link};

/// Named rebalancing case, after the shape of the overweight chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Rotation {
    /// Left-left: single right rotation
    LL,
    /// Left-right: left rotation of the left child, then right rotation
    LR,
    /// Right-right: single left rotation
    RR,
    /// Right-left: right rotation of the right child, then left rotation
    RL,
}

impl Rotation {
    /// Short label (`"LL"`, `"LR"`, `"RR"`, `"RL"`)
    pub fn as_str(self) -> &'static str {
        match self {
            Rotation::LL => "LL",
            Rotation::LR => "LR",
            Rotation::RR => "RR",
            Rotation::RL => "RL",
        }
    }

    /// Whether this case needs two primitive rotations
    pub fn is_double(self) -> bool {
        matches!(self, Rotation::LR | Rotation::RL)
    }

    /// Values whose child links change when this rotation runs at `node`.
    ///
    /// Single rotations touch the node and its heavy child; double rotations
    /// also touch the heavy child's inner child.
    pub(crate) fn participants<V: Key>(self, node: &Link<V>) -> Vec<V> {
        let mut values = vec![node.value];
        match self {
            Rotation::LL | Rotation::LR => {
                if let Some(left) = node.left.as_ref() {
                    values.push(left.value);
                    if self == Rotation::LR {
                        values.extend(left.right.as_ref().map(|inner| inner.value));
                    }
                }
            }
            Rotation::RR | Rotation::RL => {
                if let Some(right) = node.right.as_ref() {
                    values.push(right.value);
                    if self == Rotation::RL {
                        values.extend(right.left.as_ref().map(|inner| inner.value));
                    }
                }
            }
        }
        values
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotate right around `y`; `y.left` must be present.
///
/// Returns the new subtree root (the former left child).
pub fn rotate_right<V: Key>(mut y: Link<V>) -> Link<V> {
    let left = Arc::make_mut(&mut y).left.take();
    let mut x = match left {
        Some(x) => x,
        None => panic!(
            "invariant violation: rotate_right at {} without a left child",
            y.value
        ),
    };
    let t2 = Arc::make_mut(&mut x).right.take();

    let y_mut = Arc::make_mut(&mut y);
    y_mut.left = t2;
    y_mut.update_height();

    let x_mut = Arc::make_mut(&mut x);
    x_mut.right = Some(y);
    x_mut.update_height();
    x
}

/// Rotate left around `x`; `x.right` must be present.
///
/// Returns the new subtree root (the former right child).
pub fn rotate_left<V: Key>(mut x: Link<V>) -> Link<V> {
    let right = Arc::make_mut(&mut x).right.take();
    let mut y = match right {
        Some(y) => y,
        None => panic!(
            "invariant violation: rotate_left at {} without a right child",
            x.value
        ),
    };
    let t2 = Arc::make_mut(&mut y).left.take();

    let x_mut = Arc::make_mut(&mut x);
    x_mut.right = t2;
    x_mut.update_height();

    let y_mut = Arc::make_mut(&mut y);
    y_mut.left = Some(x);
    y_mut.update_height();
    y
}

/// Apply a named rebalancing case at `node`, returning the new subtree root.
pub fn apply<V: Key>(mut node: Link<V>, rotation: Rotation) -> Link<V> {
    match rotation {
        Rotation::LL => rotate_right(node),
        Rotation::RR => rotate_left(node),
        Rotation::LR => {
            let inner = Arc::make_mut(&mut node);
            inner.left = inner.left.take().map(rotate_left);
            rotate_right(node)
        }
        Rotation::RL => {
            let inner = Arc::make_mut(&mut node);
            inner.right = inner.right.take().map(rotate_right);
            rotate_left(node)
        }
    }
}
