//! AVL tree
//!
//! Top-down recursive algorithms over parent-less nodes; each call returns
//! the new subtree root. Nodes are shared copy-on-write, so cloning a tree is
//! O(1) and mutating a clone copies only the edited root-to-node path.
//!
//! Invariants after every completed insert/remove:
//!   height(n) = 1 + max(height(left), height(right))
//!   |balance(n)| <= 1
//!   inorder traversal strictly increasing

mod delete;
mod insert;
mod node;
mod rotation;

pub use node::{balance, height, Key, Link, Node, NodeId};
pub use rotation::{rotate_left, rotate_right, Rotation};

pub(crate) use delete::delete;
pub(crate) use insert::insert;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::trace::recorder::{Operation, Recorder};

/// Broken structural invariant (a programmer defect, never expected input)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Cached height disagrees with the children
    #[error("cached height {cached} at {value} but children imply {actual}")]
    HeightMismatch {
        /// Node value
        value: String,
        /// Height stored on the node
        cached: u32,
        /// Height recomputed from the children
        actual: u32,
    },

    /// Balance factor outside {-1, 0, 1}
    #[error("balance factor {balance} at {value}")]
    Unbalanced {
        /// Node value
        value: String,
        /// Offending balance factor
        balance: i32,
    },

    /// Inorder sequence not strictly increasing
    #[error("ordering violated: {next} follows {previous}")]
    OrderViolation {
        /// Earlier value in inorder sequence
        previous: String,
        /// Later value that is not larger
        next: String,
    },
}

/// Self-balancing binary search tree
#[derive(Debug, Clone)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct AvlTree<V> {
    pub(crate) root: Option<Link<V>>,

    /// Next id to issue
    #[cfg_attr(feature = "visualize", serde(skip))]
    pub(crate) next_id: u64,
}

impl<V: Key> Default for AvlTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Key> AvlTree<V> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            root: None,
            next_id: 0,
        }
    }

    pub(crate) fn from_parts(root: Option<Link<V>>, next_id: u64) -> Self {
        Self { root, next_id }
    }

    /// Root node, if any
    pub fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }

    /// Whether the tree holds no values
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        fn count<V>(link: Option<&Link<V>>) -> usize {
            link.map_or(0, |node| 1 + count(node.left.as_ref()) + count(node.right.as_ref()))
        }
        count(self.root.as_ref())
    }

    /// Height of the root (0 when empty)
    pub fn height(&self) -> u32 {
        height(self.root.as_ref())
    }

    /// Check whether `value` is stored
    pub fn contains(&self, value: V) -> bool {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match value.cmp(&node.value) {
                std::cmp::Ordering::Less => node.left.as_deref(),
                std::cmp::Ordering::Greater => node.right.as_deref(),
                std::cmp::Ordering::Equal => return true,
            };
        }
        false
    }

    /// Values in ascending order
    pub fn inorder(&self) -> Vec<V> {
        let mut values = Vec::new();
        let mut stack: Vec<&Node<V>> = Vec::new();
        let mut current = self.root.as_deref();
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                values.push(node.value);
                current = node.right.as_deref();
            }
        }
        values
    }

    /// Balance factor of every node, recomputed from structure.
    ///
    /// Cached heights are not trusted, so the map is accurate even for
    /// snapshots taken mid-operation.
    pub fn balance_factors(&self) -> BTreeMap<V, i32> {
        fn walk<V: Key>(link: Option<&Link<V>>, out: &mut BTreeMap<V, i32>) -> i32 {
            let Some(node) = link else { return 0 };
            let left = walk(node.left.as_ref(), out);
            let right = walk(node.right.as_ref(), out);
            out.insert(node.value, left - right);
            1 + left.max(right)
        }
        let mut factors = BTreeMap::new();
        walk(self.root.as_ref(), &mut factors);
        factors
    }

    /// Verify cached heights, balance and ordering for every node
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        fn check<V: Key>(
            link: Option<&Link<V>>,
            previous: &mut Option<V>,
        ) -> Result<u32, InvariantViolation> {
            let Some(node) = link else { return Ok(0) };

            let left = check(node.left.as_ref(), previous)?;
            if let Some(prev) = *previous {
                if prev >= node.value {
                    return Err(InvariantViolation::OrderViolation {
                        previous: prev.to_string(),
                        next: node.value.to_string(),
                    });
                }
            }
            *previous = Some(node.value);
            let right = check(node.right.as_ref(), previous)?;

            let actual = 1 + left.max(right);
            if node.height != actual {
                return Err(InvariantViolation::HeightMismatch {
                    value: node.value.to_string(),
                    cached: node.height,
                    actual,
                });
            }
            let balance = left as i32 - right as i32;
            if balance.abs() > 1 {
                return Err(InvariantViolation::Unbalanced {
                    value: node.value.to_string(),
                    balance,
                });
            }
            Ok(actual)
        }
        check(self.root.as_ref(), &mut None).map(|_| ())
    }

    /// Insert `value`, rebalancing as needed.
    ///
    /// Returns `false` (and leaves the tree alone) if it was already present.
    pub fn insert(&mut self, value: V) -> bool {
        let mut recorder = Recorder::silent(Operation::Insert, value, self.next_id);
        self.root = Some(insert(self.root.take(), value, &mut recorder));
        let inserted = recorder.mutated();
        self.next_id = recorder.finish(None).0;
        inserted
    }

    /// Remove `value`, rebalancing every affected ancestor.
    ///
    /// Returns `false` (and leaves the tree alone) if it was absent.
    pub fn remove(&mut self, value: V) -> bool {
        if !self.contains(value) {
            return false;
        }
        let mut recorder = Recorder::silent(Operation::Delete, value, self.next_id);
        self.root = delete(self.root.take(), value, &mut recorder);
        true
    }
}

/// Shared unwind step: refresh height, inspect balance, rotate if `pick` says so.
pub(crate) fn rebalance<V, F>(mut node: Link<V>, recorder: &mut Recorder<V>, pick: F) -> Link<V>
where
    V: Key,
    F: FnOnce(&Link<V>, i32) -> Option<Rotation>,
{
    let fresh = 1 + height(node.left.as_ref()).max(height(node.right.as_ref()));
    if node.height != fresh {
        Arc::make_mut(&mut node).update_height();
    }

    let factor = node.balance();
    recorder.check_balance(&node, factor);
    let Some(rotation) = pick(&node, factor) else {
        return node;
    };

    debug!(node = %node.value, balance = factor, %rotation, "rebalancing");
    recorder.rotation_needed(&node, factor, rotation);
    let node = rotation::apply(node, rotation);
    recorder.rotation_complete(&node, rotation);
    node
}

impl<V: Key> PartialEq for AvlTree<V> {
    /// Structural equality: values, heights and shape (node ids are ignored)
    fn eq(&self, other: &Self) -> bool {
        node::same_structure(self.root.as_ref(), other.root.as_ref())
    }
}

impl<V: Key> Eq for AvlTree<V> {}

impl<V: Key> FromIterator<V> for AvlTree<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut tree = Self::new();
        for value in iter {
            tree.insert(value);
        }
        tree
    }
}

impl<V: Key> fmt::Display for AvlTree<V> {
    /// Indented rendering, left child first:
    ///
    /// ```text
    /// 20 [bf 0]
    /// ├── L: 10 [bf 0]
    /// └── R: 30 [bf 0]
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn children<V: Key>(
            f: &mut fmt::Formatter<'_>,
            node: &Node<V>,
            prefix: &str,
        ) -> fmt::Result {
            let slots = [("L", node.left.as_deref()), ("R", node.right.as_deref())];
            let present: Vec<_> = slots
                .iter()
                .filter_map(|(label, child)| child.map(|child| (*label, child)))
                .collect();
            for (i, (label, child)) in present.iter().enumerate() {
                let last = i + 1 == present.len();
                let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
                writeln!(f, "{prefix}{branch}{label}: {} [bf {}]", child.value, child.balance())?;
                children(f, child, &format!("{prefix}{indent}"))?;
            }
            Ok(())
        }

        match self.root.as_deref() {
            None => writeln!(f, "(empty)"),
            Some(root) => {
                writeln!(f, "{} [bf {}]", root.value, root.balance())?;
                children(f, root, "")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let mut tree = AvlTree::new();
        assert!(tree.is_empty());
        for value in [50, 30, 70, 20, 40] {
            assert!(tree.insert(value));
        }
        assert!(!tree.insert(30));

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.height(), 3);
        assert!(tree.contains(40));
        assert!(!tree.contains(45));
        assert_eq!(tree.inorder(), vec![20, 30, 40, 50, 70]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut tree: AvlTree<i32> = (1..=7).collect();
        assert!(tree.remove(4));
        assert!(!tree.remove(4));
        assert_eq!(tree.inorder(), vec![1, 2, 3, 5, 6, 7]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_clone_is_isolated_from_mutation() {
        let original: AvlTree<i32> = (1..=15).collect();
        let mut copy = original.clone();
        for value in 1..=8 {
            copy.remove(value);
        }
        assert_eq!(original.inorder(), (1..=15).collect::<Vec<_>>());
        assert_eq!(copy.inorder(), (9..=15).collect::<Vec<_>>());
        assert!(original.validate().is_ok());
        assert!(copy.validate().is_ok());
    }

    #[test]
    fn test_structural_equality_ignores_ids() {
        let a: AvlTree<i32> = [2, 1, 3].into_iter().collect();
        let b: AvlTree<i32> = [2, 3, 1].into_iter().collect();
        let c: AvlTree<i32> = [1, 2, 3, 4].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_validate_detects_stale_height() {
        let mut tree: AvlTree<i32> = [2, 1, 3].into_iter().collect();
        if let Some(root) = tree.root.as_mut() {
            Arc::make_mut(root).height = 7;
        }
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::HeightMismatch {
                value: "2".to_string(),
                cached: 7,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_validate_detects_order_violation() {
        let mut tree: AvlTree<i32> = [2, 1, 3].into_iter().collect();
        if let Some(root) = tree.root.as_mut() {
            Arc::make_mut(root).value = 0;
        }
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::OrderViolation { .. })
        ));
    }

    #[test]
    fn test_display_renders_labelled_children() {
        let tree: AvlTree<i32> = [20, 10, 30, 5].into_iter().collect();
        let rendered = tree.to_string();
        assert_eq!(
            rendered,
            "20 [bf 1]\n├── L: 10 [bf 1]\n│   └── L: 5 [bf 0]\n└── R: 30 [bf 0]\n"
        );
        assert_eq!(AvlTree::<i32>::new().to_string(), "(empty)\n");
    }
}
