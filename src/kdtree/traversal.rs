//! Utilities to traverse the tree structure.

use crate::kdtree::node::KdNode;
use crate::point::Point;

/// A read-only view onto one node of a [`KdTree`][crate::kdtree::KdTree].
///
/// Exposes the node's point, cached height and children, which is enough for
/// an external consumer to walk the whole tree, e.g. to serialize it for
/// rendering. The discriminating dimension of a node is `depth mod k`, with
/// the root at depth 0.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    node: &'a KdNode,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(node: &'a KdNode) -> Self {
        Self { node }
    }

    /// The point stored in this node.
    pub fn point(&self) -> &'a Point {
        self.node.point()
    }

    /// The height of the subtree rooted at this node; 0 for a leaf.
    pub fn height(&self) -> i32 {
        self.node.height()
    }

    /// The subtree of points smaller on this node's discriminating dimension.
    pub fn left(&self) -> Option<NodeRef<'a>> {
        self.node.left().map(NodeRef::new)
    }

    /// The subtree of points greater-or-equal on this node's discriminating
    /// dimension.
    pub fn right(&self) -> Option<NodeRef<'a>> {
        self.node.right().map(NodeRef::new)
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.node.left().is_none() && self.node.right().is_none()
    }
}
