//! # AVL tree with a replayable step trace
//!
//! A self-balancing binary search tree whose insertions and deletions can be
//! recorded as an ordered, immutable sequence of steps (comparisons, case
//! classification, balance checks, rotations), plus a cursor-based playback
//! controller for scrubbing through a recorded trace.
//!
//! ## Core pieces
//!
//! 1. **Tree**: top-down recursive insert/delete with rebalancing; insertion
//!    picks rotation cases by value, deletion by the heavy child's balance
//! 2. **Recorder**: every decision point becomes a `Step` holding a complete
//!    snapshot; unchanged subtrees are shared between snapshots
//! 3. **Playback**: play/pause/step/seek/reset over a finished trace
//!
//! ## Usage Example
//!
//! ```
//! use avl_trace::{build_tree, record_deletion, PlaybackController, StepKind};
//!
//! let tree = build_tree([50, 30, 70, 20, 40, 60, 80, 10, 25, 35, 45]);
//! let (after, trace) = record_deletion(&tree, 30);
//!
//! assert!(trace.iter().any(|step| step.kind == StepKind::DeleteTwoChildren));
//! assert!(!after.contains(30));
//! assert!(tree.contains(30));
//!
//! let mut playback = PlaybackController::attach(trace)?;
//! playback.step_forward();
//! println!("{}", playback.current_step().description);
//! # Ok::<(), avl_trace::PlaybackError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod playback; // Cursor-based trace playback
pub mod trace; // Step recording
pub mod tree; // AVL tree algorithms

// Re-exports for convenience
pub use playback::{PlaybackConfig, PlaybackController, PlaybackError};
pub use trace::{record_deletion, record_insertion, Step, StepKind, StepTrace};
pub use tree::{AvlTree, InvariantViolation, Key, Node, NodeId, Rotation};

use tracing::debug;

/// Build a tree by inserting `values` in order, starting from empty.
///
/// Duplicates are skipped silently.
pub fn build_tree<V, I>(values: I) -> AvlTree<V>
where
    V: Key,
    I: IntoIterator<Item = V>,
{
    let tree: AvlTree<V> = values.into_iter().collect();
    debug!(len = tree.len(), height = tree.height(), "built tree");
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tree_skips_duplicates() {
        let tree = build_tree([3, 1, 3, 2, 1]);
        assert_eq!(tree.inorder(), vec![1, 2, 3]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_record_deletion_does_not_touch_input() {
        let tree = build_tree([10, 5, 15]);
        let before = tree.clone();
        let (after, trace) = record_deletion(&tree, 10);

        assert_eq!(tree, before);
        assert_eq!(after.inorder(), vec![5, 15]);
        assert_eq!(trace.last().map(|step| step.kind), Some(StepKind::Complete));
    }
}
