//! Node model and balance calculator
//!
//! Node = value + two optional children + cached height
//! Children are shared (`Arc`) and mutated copy-on-write, so a snapshot
//! of a tree is just another handle to the same root.
//!   height(absent) = 0
//!   balance(n)     = height(n.left) - height(n.right)

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Totally ordered scalar key stored in the tree.
pub trait Key: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> Key for T where T: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Shared owning handle to a child subtree
pub type Link<V> = Arc<Node<V>>;

/// Stable node identity, issued sequentially by the owning tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tree node
#[derive(Debug, Clone)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Node<V> {
    /// Identity assigned at creation (kept across rotations and value copies)
    pub(crate) id: NodeId,

    /// Ordered key
    pub(crate) value: V,

    /// Left subtree (all values smaller)
    pub(crate) left: Option<Link<V>>,

    /// Right subtree (all values larger)
    pub(crate) right: Option<Link<V>>,

    /// Cached height, >= 1
    pub(crate) height: u32,
}

impl<V: Key> Node<V> {
    /// Create a detached leaf
    pub(crate) fn leaf(id: NodeId, value: V) -> Self {
        Self {
            id,
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    /// Node identity
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Stored value
    pub fn value(&self) -> V {
        self.value
    }

    /// Cached height (1 for a leaf)
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Left child, if any
    pub fn left(&self) -> Option<&Node<V>> {
        self.left.as_deref()
    }

    /// Right child, if any
    pub fn right(&self) -> Option<&Node<V>> {
        self.right.as_deref()
    }

    /// Check if leaf (no children)
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Balance factor from the children's cached heights
    #[inline]
    pub fn balance(&self) -> i32 {
        height(self.left.as_ref()) as i32 - height(self.right.as_ref()) as i32
    }

    /// Recompute the cached height from the children.
    ///
    /// Must run on every node whose children changed before its balance
    /// is read again.
    #[inline]
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + height(self.left.as_ref()).max(height(self.right.as_ref()));
    }
}

/// Height of an optional subtree (0 when absent)
#[inline]
pub fn height<V>(link: Option<&Link<V>>) -> u32 {
    link.map_or(0, |node| node.height)
}

/// Balance factor of an optional subtree (0 when absent)
#[inline]
pub fn balance<V: Key>(link: Option<&Link<V>>) -> i32 {
    link.map_or(0, |node| node.balance())
}

/// Leftmost (smallest) value of a subtree
pub(crate) fn leftmost<V: Key>(node: &Node<V>) -> V {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current.value
}

/// Compare two subtrees by values, heights and shape (ids ignored)
pub(crate) fn same_structure<V: Key>(a: Option<&Link<V>>, b: Option<&Link<V>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            Arc::ptr_eq(x, y)
                || (x.value == y.value
                    && x.height == y.height
                    && same_structure(x.left.as_ref(), y.left.as_ref())
                    && same_structure(x.right.as_ref(), y.right.as_ref()))
        }
        _ => false,
    }
}

impl<V: Key> fmt::Display for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (h={}, bf={})", self.value, self.height, self.balance())
    }
}
