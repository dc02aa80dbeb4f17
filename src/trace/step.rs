//! Recorded checkpoints
//!
//! A `Step` is created once by the recorder and never mutated afterwards.
//! Its `tree` is a complete snapshot; untouched subtrees are shared with
//! neighbouring steps, edited paths are copied.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::tree::{AvlTree, Key, Rotation};

/// Kind of algorithmic event a step captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
#[cfg_attr(feature = "visualize", serde(rename_all = "kebab-case"))]
pub enum StepKind {
    /// Comparing against a node on the way down
    Search,
    /// Deletion target reached
    Found,
    /// Target has no children
    DeleteLeaf,
    /// Target has exactly one child
    DeleteOneChild,
    /// Target has two children; replaced by its inorder successor
    DeleteTwoChildren,
    /// Structural removal finished, rebalancing not yet started
    Deleted,
    /// New leaf attached
    Inserted,
    /// Value already present, insertion is a no-op
    Duplicate,
    /// Balance factor inspected on the way back up
    CheckBalance,
    /// Imbalance detected, rotation about to run
    RotationNeeded,
    /// Rotation applied
    RotationComplete,
    /// Deletion target absent (or tree empty)
    NotFound,
    /// Operation finished, tree fully rebalanced
    Complete,
}

impl StepKind {
    /// Stable kebab-case label
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Search => "search",
            StepKind::Found => "found",
            StepKind::DeleteLeaf => "delete-leaf",
            StepKind::DeleteOneChild => "delete-one-child",
            StepKind::DeleteTwoChildren => "delete-two-children",
            StepKind::Deleted => "deleted",
            StepKind::Inserted => "inserted",
            StepKind::Duplicate => "duplicate",
            StepKind::CheckBalance => "check-balance",
            StepKind::RotationNeeded => "rotation-needed",
            StepKind::RotationComplete => "rotation-complete",
            StepKind::NotFound => "not-found",
            StepKind::Complete => "complete",
        }
    }

    /// Whether this kind classifies the deletion case
    pub fn is_delete_case(self) -> bool {
        matches!(
            self,
            StepKind::DeleteLeaf | StepKind::DeleteOneChild | StepKind::DeleteTwoChildren
        )
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable checkpoint of a recorded operation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Step<V: Key> {
    /// Event kind
    pub kind: StepKind,

    /// Full snapshot of the tree at this instant
    pub tree: AvlTree<V>,

    /// Node under examination
    pub current_value: Option<V>,

    /// Values visited so far, root first
    pub path: Vec<V>,

    /// Values whose links change in the announced rotation
    pub rotation_nodes: BTreeSet<V>,

    /// Values to emphasise
    pub highlighted: BTreeSet<V>,

    /// Balance factor of every node in `tree`, recomputed from structure
    pub balance_factors: BTreeMap<V, i32>,

    /// Rotation case, for rotation steps
    pub rotation_type: Option<Rotation>,

    /// Value being deleted
    pub deleted_value: Option<V>,

    /// Value taking the deleted node's place (child or successor)
    pub replacement_value: Option<V>,

    /// Caption text
    pub description: String,
}

impl<V: Key> Step<V> {
    pub(crate) fn new(
        kind: StepKind,
        tree: AvlTree<V>,
        current_value: Option<V>,
        path: Vec<V>,
    ) -> Self {
        let balance_factors = tree.balance_factors();
        Self {
            kind,
            tree,
            current_value,
            path,
            rotation_nodes: BTreeSet::new(),
            highlighted: current_value.into_iter().collect(),
            balance_factors,
            rotation_type: None,
            deleted_value: None,
            replacement_value: None,
            description: String::new(),
        }
    }

    /// Balance factor recorded for `value` in this step's snapshot
    pub fn balance_of(&self, value: V) -> Option<i32> {
        self.balance_factors.get(&value).copied()
    }

    /// Whether `value` sits on the recorded search path
    pub fn on_path(&self, value: V) -> bool {
        self.path.contains(&value)
    }
}

impl<V: Key> fmt::Display for Step<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}
