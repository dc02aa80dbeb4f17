//! Step trace recorder
//!
//! The tree algorithms are written once and call into a `Recorder` at each
//! decision point. A silent recorder ignores the calls; a recording one
//! snapshots the tree and appends a `Step`.
//!
//! Snapshots: the recursion owns only the current subtree, so the recorder
//! keeps the ancestors above it (each with the descended-into slot emptied)
//! and path-copies them over the current subtree on demand.

use std::sync::Arc;

use tracing::trace;

use super::step::{Step, StepKind};
use crate::tree::{AvlTree, Key, Link, Node, NodeId, Rotation};

/// Which child slot the recursion descended into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn slot<V>(self, node: &mut Node<V>) -> &mut Option<Link<V>> {
        match self {
            Side::Left => &mut node.left,
            Side::Right => &mut node.right,
        }
    }

    fn symbol(self) -> (&'static str, &'static str) {
        match self {
            Side::Left => ("<", "left"),
            Side::Right => (">", "right"),
        }
    }
}

/// Operation being driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Insert,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the target
    Descending,
    /// Removing the inorder successor (events folded into `deleted`)
    Successor,
    /// Structure changed, unwinding and rebalancing
    Rebalancing,
}

#[derive(Debug)]
struct Frame<V> {
    node: Link<V>,
    side: Side,
}

/// Decision-point sink shared by insertion and deletion
#[derive(Debug)]
pub(crate) struct Recorder<V: Key> {
    operation: Operation,
    target: V,
    next_id: u64,
    phase: Phase,
    replacement: Option<V>,
    frames: Vec<Frame<V>>,
    path: Vec<V>,
    steps: Option<Vec<Step<V>>>,
}

impl<V: Key> Recorder<V> {
    /// Recorder that only tracks id issuance and mutation
    pub(crate) fn silent(operation: Operation, target: V, next_id: u64) -> Self {
        Self {
            operation,
            target,
            next_id,
            phase: Phase::Descending,
            replacement: None,
            frames: Vec::new(),
            path: Vec::new(),
            steps: None,
        }
    }

    /// Recorder that captures a step at every decision point
    pub(crate) fn recording(operation: Operation, target: V, next_id: u64) -> Self {
        Self {
            steps: Some(Vec::new()),
            ..Self::silent(operation, target, next_id)
        }
    }

    /// Issue the next sequential node id
    pub(crate) fn issue_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Whether the structure was changed by the operation
    pub(crate) fn mutated(&self) -> bool {
        self.phase == Phase::Rebalancing
    }

    fn is_recording(&self) -> bool {
        self.steps.is_some()
    }

    /// Push `node` as the ancestor of everything recorded until `ascend`
    pub(crate) fn descend(&mut self, node: &Link<V>, side: Side) {
        if self.is_recording() {
            self.frames.push(Frame {
                node: Arc::clone(node),
                side,
            });
        }
    }

    pub(crate) fn ascend(&mut self) {
        if self.is_recording() {
            self.frames.pop();
        }
    }

    /// Comparison at `node` sends the search to `side`
    pub(crate) fn visit(&mut self, node: &Link<V>, side: Side) {
        if !self.is_recording() {
            return;
        }
        self.path.push(node.value);
        if self.phase != Phase::Descending {
            return;
        }

        let target = self.target;
        let (cmp, direction) = side.symbol();
        let verb = match self.operation {
            Operation::Insert => "Inserting",
            Operation::Delete => "Searching for",
        };
        self.emit(StepKind::Search, Some(node), Some(node.value), |step| {
            step.description = format!(
                "{verb} {target}: {target} {cmp} {}, go {direction}",
                node.value
            );
        });
    }

    pub(crate) fn found(&mut self, node: &Link<V>) {
        if !self.is_recording() {
            return;
        }
        self.path.push(node.value);
        if self.phase != Phase::Descending {
            return;
        }
        self.emit(StepKind::Found, Some(node), Some(node.value), |step| {
            step.description = format!("Found {}", node.value);
        });
    }

    pub(crate) fn delete_leaf(&mut self, node: &Link<V>) {
        if self.phase != Phase::Descending {
            return;
        }
        self.emit(StepKind::DeleteLeaf, Some(node), Some(node.value), |step| {
            step.deleted_value = Some(node.value);
            step.description = format!("{} is a leaf: remove it", node.value);
        });
    }

    pub(crate) fn delete_one_child(&mut self, node: &Link<V>, child: V) {
        if self.phase != Phase::Descending {
            return;
        }
        self.replacement = Some(child);
        self.emit(StepKind::DeleteOneChild, Some(node), Some(node.value), |step| {
            step.deleted_value = Some(node.value);
            step.replacement_value = Some(child);
            step.highlighted.insert(child);
            step.description = format!(
                "{} has one child: replace it with {child}",
                node.value
            );
        });
    }

    /// Announce the two-children case; successor removal is folded into `deleted`
    pub(crate) fn delete_two_children(&mut self, node: &Link<V>, successor: V) {
        if self.phase != Phase::Descending {
            return;
        }
        self.replacement = Some(successor);
        self.emit(StepKind::DeleteTwoChildren, Some(node), Some(node.value), |step| {
            step.deleted_value = Some(node.value);
            step.replacement_value = Some(successor);
            step.highlighted.insert(successor);
            step.description = format!(
                "{} has two children: inorder successor {successor} \
                 (leftmost of the right subtree) takes its place",
                node.value
            );
        });
        self.phase = Phase::Successor;
    }

    /// Structural removal done; `subtree` now occupies the removed node's slot
    pub(crate) fn deleted(&mut self, subtree: Option<&Link<V>>) {
        let via_successor = self.phase == Phase::Successor;
        self.phase = Phase::Rebalancing;

        let target = self.target;
        let replacement = self.replacement;
        self.emit(StepKind::Deleted, subtree, replacement, |step| {
            step.deleted_value = Some(target);
            step.replacement_value = replacement;
            step.description = match replacement {
                Some(successor) if via_successor => format!(
                    "Copied {successor} into {target}'s node and removed the original {successor}"
                ),
                Some(child) => format!("Removed {target}; {child} moves up into its place"),
                None => format!("Removed {target}"),
            };
        });
    }

    pub(crate) fn inserted(&mut self, node: &Link<V>) {
        self.phase = Phase::Rebalancing;
        let at_root = self.frames.is_empty();
        self.emit(StepKind::Inserted, Some(node), Some(node.value), |step| {
            step.description = if at_root {
                format!("Inserted {} as the root", node.value)
            } else {
                format!("Inserted {} as a new leaf", node.value)
            };
        });
    }

    pub(crate) fn duplicate(&mut self, node: &Link<V>) {
        self.emit(StepKind::Duplicate, Some(node), Some(node.value), |step| {
            step.description = format!("{} is already in the tree: nothing to insert", node.value);
        });
    }

    /// Balance inspection on the unwind; only reported once something changed
    pub(crate) fn check_balance(&mut self, node: &Link<V>, factor: i32) {
        if self.phase != Phase::Rebalancing {
            return;
        }
        self.emit(StepKind::CheckBalance, Some(node), Some(node.value), |step| {
            let verdict = if factor.abs() <= 1 { "balanced" } else { "unbalanced" };
            step.description = format!(
                "Checking {}: balance factor {factor} ({verdict})",
                node.value
            );
        });
    }

    pub(crate) fn rotation_needed(&mut self, node: &Link<V>, factor: i32, rotation: Rotation) {
        let participants = rotation.participants(node);
        self.emit(StepKind::RotationNeeded, Some(node), Some(node.value), |step| {
            step.rotation_type = Some(rotation);
            step.rotation_nodes = participants.iter().copied().collect();
            step.highlighted.extend(participants.iter().copied());
            let plan = match (rotation, participants.get(1)) {
                (Rotation::LL, _) => format!("rotate right at {}", node.value),
                (Rotation::RR, _) => format!("rotate left at {}", node.value),
                (Rotation::LR, Some(child)) => {
                    format!("rotate left at {child}, then right at {}", node.value)
                }
                (Rotation::RL, Some(child)) => {
                    format!("rotate right at {child}, then left at {}", node.value)
                }
                (_, None) => format!("rotate at {}", node.value),
            };
            step.description = format!(
                "{} is unbalanced (balance factor {factor}): {rotation} case, {plan}",
                node.value
            );
        });
    }

    pub(crate) fn rotation_complete(&mut self, node: &Link<V>, rotation: Rotation) {
        self.emit(StepKind::RotationComplete, Some(node), Some(node.value), |step| {
            step.rotation_type = Some(rotation);
            step.description = format!(
                "{rotation} rotation complete: {} is the new subtree root",
                node.value
            );
        });
    }

    /// Close the recording with a `complete` step over the final tree.
    ///
    /// Returns the next free node id and the recorded steps (empty when silent).
    pub(crate) fn finish(mut self, root: Option<&Link<V>>) -> (u64, Vec<Step<V>>) {
        debug_assert!(self.frames.is_empty(), "unbalanced descend/ascend");

        let target = self.target;
        let operation = self.operation;
        let mutated = self.mutated();
        let replacement = self.replacement;
        self.emit(StepKind::Complete, root, None, |step| {
            let height = step.tree.height();
            if operation == Operation::Delete {
                step.deleted_value = Some(target);
                step.replacement_value = replacement;
            }
            step.description = match operation {
                Operation::Insert if mutated => {
                    format!("Insertion of {target} complete: tree height {height}")
                }
                Operation::Insert => format!("{target} already present: tree unchanged"),
                Operation::Delete => format!("Deletion of {target} complete: tree height {height}"),
            };
        });
        (self.next_id, self.steps.unwrap_or_default())
    }

    fn emit<F>(&mut self, kind: StepKind, subtree: Option<&Link<V>>, current: Option<V>, fill: F)
    where
        F: FnOnce(&mut Step<V>),
    {
        if !self.is_recording() {
            return;
        }

        let tree = self.snapshot(subtree);
        let mut step = Step::new(kind, tree, current, self.path.clone());
        fill(&mut step);
        trace!(kind = %step.kind, current = ?step.current_value, "recorded step");

        if let Some(steps) = self.steps.as_mut() {
            steps.push(step);
        }
    }

    /// Whole-tree view with `subtree` placed below the current ancestors.
    ///
    /// Ancestor copies get fresh heights so the snapshot is self-consistent.
    fn snapshot(&self, subtree: Option<&Link<V>>) -> AvlTree<V> {
        let mut root = subtree.cloned();
        for frame in self.frames.iter().rev() {
            let mut parent = Node::clone(&frame.node);
            *frame.side.slot(&mut parent) = root;
            parent.update_height();
            root = Some(Arc::new(parent));
        }
        AvlTree::from_parts(root, self.next_id)
    }
}

/// Run `f` on the `side` child of `node`, reattaching whatever it returns.
///
/// The child is detached while `f` runs so the recursion owns it; `node`
/// is registered as an ancestor for snapshots in the meantime.
pub(crate) fn with_child<V, F>(node: &mut Link<V>, side: Side, recorder: &mut Recorder<V>, f: F)
where
    V: Key,
    F: FnOnce(Option<Link<V>>, &mut Recorder<V>) -> Option<Link<V>>,
{
    let child = side.slot(Arc::make_mut(node)).take();
    recorder.descend(node, side);
    let child = f(child, recorder);
    recorder.ascend();
    *side.slot(Arc::make_mut(node)) = child;
}
