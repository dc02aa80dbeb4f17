//! Step traces
//!
//! Recorded insertion/deletion: the live algorithm runs against a clone of
//! the caller's tree and reports every decision point to a recorder, which
//! appends an immutable `Step` in exact event order.
//!
//! Deletion trace shape:
//!   search* found delete-{leaf|one-child|two-children} deleted
//!   (check-balance (rotation-needed rotation-complete)?)* complete
//! or a single `not-found` step.

pub(crate) mod recorder;
mod step;

pub use step::{Step, StepKind};

use std::fmt::Write as _;
use std::ops::Index;
use std::sync::Arc;

use tracing::debug;

use crate::tree::{self, AvlTree, Key, Link};
use recorder::{Operation, Recorder};

/// Ordered, immutable sequence of steps
///
/// Cloning shares the steps; readers never need synchronization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
#[cfg_attr(feature = "visualize", serde(transparent))]
pub struct StepTrace<V: Key> {
    steps: Arc<[Step<V>]>,
}

impl<V: Key> StepTrace<V> {
    pub(crate) fn from_steps(steps: Vec<Step<V>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trace holds no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`
    pub fn get(&self, index: usize) -> Option<&Step<V>> {
        self.steps.get(index)
    }

    /// First step
    pub fn first(&self) -> Option<&Step<V>> {
        self.steps.first()
    }

    /// Last step (`complete` or `not-found`)
    pub fn last(&self) -> Option<&Step<V>> {
        self.steps.last()
    }

    /// Iterate steps in event order
    pub fn iter(&self) -> std::slice::Iter<'_, Step<V>> {
        self.steps.iter()
    }

    /// All steps as a slice
    pub fn as_slice(&self) -> &[Step<V>] {
        &self.steps
    }

    /// Kinds in event order
    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|step| step.kind).collect()
    }

    /// Tree held by the last step
    pub fn final_tree(&self) -> Option<&AvlTree<V>> {
        self.last().map(|step| &step.tree)
    }

    /// BLAKE3 digest over kind, current value, rotation, path and tree shape
    /// of every step. Equal for traces of the same operation on equal trees.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        let mut line = String::new();
        for step in self.steps.iter() {
            line.clear();
            let _ = write!(
                line,
                "{}|{:?}|{:?}|{:?}|",
                step.kind, step.current_value, step.rotation_type, step.path
            );
            write_shape(&mut line, step.tree.root.as_ref());
            line.push('\n');
            hasher.update(line.as_bytes());
        }
        hasher.finalize()
    }
}

fn write_shape<V: Key>(out: &mut String, link: Option<&Link<V>>) {
    match link {
        None => out.push('.'),
        Some(node) => {
            let _ = write!(out, "({}:{} ", node.value, node.height);
            write_shape(out, node.left.as_ref());
            out.push(' ');
            write_shape(out, node.right.as_ref());
            out.push(')');
        }
    }
}

impl<V: Key> Index<usize> for StepTrace<V> {
    type Output = Step<V>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl<'a, V: Key> IntoIterator for &'a StepTrace<V> {
    type Item = &'a Step<V>;
    type IntoIter = std::slice::Iter<'a, Step<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Insert `value` into a copy of `tree`, recording every decision point.
///
/// The caller's tree is left untouched.
pub fn record_insertion<V: Key>(tree: &AvlTree<V>, value: V) -> (AvlTree<V>, StepTrace<V>) {
    let mut recorder = Recorder::recording(Operation::Insert, value, tree.next_id);
    let root = tree::insert(tree.root.clone(), value, &mut recorder);
    let (next_id, steps) = recorder.finish(Some(&root));

    let result = AvlTree::from_parts(Some(root), next_id);
    debug_assert!(
        result.validate().is_ok(),
        "insertion broke an invariant: {:?}",
        result.validate()
    );
    debug!(%value, steps = steps.len(), height = result.height(), "recorded insertion");
    (result, StepTrace::from_steps(steps))
}

/// Delete `value` from a copy of `tree`, recording every decision point.
///
/// An absent value (or an empty tree) yields the unchanged tree and a single
/// `not-found` step. The caller's tree is left untouched.
pub fn record_deletion<V: Key>(tree: &AvlTree<V>, value: V) -> (AvlTree<V>, StepTrace<V>) {
    if !tree.contains(value) {
        debug!(%value, "deletion target absent");
        return (tree.clone(), StepTrace::from_steps(vec![not_found(tree, value)]));
    }

    let mut recorder = Recorder::recording(Operation::Delete, value, tree.next_id);
    let root = tree::delete(tree.root.clone(), value, &mut recorder);
    let (next_id, steps) = recorder.finish(root.as_ref());

    let result = AvlTree::from_parts(root, next_id);
    debug_assert!(
        result.validate().is_ok(),
        "deletion broke an invariant: {:?}",
        result.validate()
    );
    debug!(%value, steps = steps.len(), height = result.height(), "recorded deletion");
    (result, StepTrace::from_steps(steps))
}

fn not_found<V: Key>(tree: &AvlTree<V>, value: V) -> Step<V> {
    let mut path = Vec::new();
    let mut current = tree.root();
    while let Some(node) = current {
        path.push(node.value());
        current = if value < node.value() { node.left() } else { node.right() };
    }

    let description = if path.is_empty() {
        format!("Tree is empty: nothing to delete for {value}")
    } else {
        format!("{value} is not in the tree: nothing to delete")
    };
    let mut step = Step::new(StepKind::NotFound, tree.clone(), None, path);
    step.deleted_value = Some(value);
    step.description = description;
    step
}
