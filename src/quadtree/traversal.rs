//! Utilities to traverse the tree structure.

use crate::point::Point;
use crate::quadtree::node::{BlackNode, GrayNode, QuadNode, Quadrant};

/// A read-only view onto one node of a
/// [`PrQuadTree`][crate::quadtree::PrQuadTree].
///
/// The black/gray distinction is exposed directly so that an external
/// consumer, e.g. a serializer, can walk the whole tree: black nodes carry
/// their bucket of points, gray nodes their four Z-ordered child slots.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// A leaf node and its bucket of points.
    Black(BlackRef<'a>),
    /// An internal node and its four child slots.
    Gray(GrayRef<'a>),
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(node: &'a QuadNode) -> Self {
        match node {
            QuadNode::Black(black) => NodeRef::Black(BlackRef { node: black }),
            QuadNode::Gray(gray) => NodeRef::Gray(GrayRef { node: gray }),
        }
    }

    /// The centroid of the quadrant this node spans.
    pub fn centroid(&self) -> &'a Point {
        match self {
            NodeRef::Black(black) => black.centroid(),
            NodeRef::Gray(gray) => gray.centroid(),
        }
    }

    /// The exponent defining the side length (`2^exponent`) of the quadrant
    /// this node spans.
    pub fn exponent(&self) -> i32 {
        match self {
            NodeRef::Black(black) => black.node.exponent(),
            NodeRef::Gray(gray) => gray.node.exponent(),
        }
    }

    /// The height of the subtree rooted at this node; 0 for a leaf.
    pub fn height(&self) -> i32 {
        match self {
            NodeRef::Black(_) => 0,
            NodeRef::Gray(gray) => gray.node.height(),
        }
    }

    /// The number of points stored in the subtree rooted at this node.
    pub fn count(&self) -> usize {
        match self {
            NodeRef::Black(black) => black.points().len(),
            NodeRef::Gray(gray) => gray
                .children()
                .iter()
                .flatten()
                .map(NodeRef::count)
                .sum(),
        }
    }
}

/// A read-only view onto a leaf ("black") node.
#[derive(Debug, Clone, Copy)]
pub struct BlackRef<'a> {
    node: &'a BlackNode,
}

impl<'a> BlackRef<'a> {
    /// The centroid of the quadrant this leaf spans.
    pub fn centroid(&self) -> &'a Point {
        self.node.centroid()
    }

    /// The points held by this leaf, between one and the bucket size.
    pub fn points(&self) -> &'a [Point] {
        self.node.points()
    }
}

/// A read-only view onto an internal ("gray") node.
#[derive(Debug, Clone, Copy)]
pub struct GrayRef<'a> {
    node: &'a GrayNode,
}

impl<'a> GrayRef<'a> {
    /// The centroid of the quadrant this node spans.
    pub fn centroid(&self) -> &'a Point {
        self.node.centroid()
    }

    /// The child in the given quadrant, if any.
    pub fn child(&self, quadrant: Quadrant) -> Option<NodeRef<'a>> {
        self.node.child(quadrant).map(NodeRef::new)
    }

    /// All four child slots in Z order (NW, NE, SW, SE).
    pub fn children(&self) -> [Option<NodeRef<'a>>; 4] {
        [
            self.child(Quadrant::Nw),
            self.child(Quadrant::Ne),
            self.child(Quadrant::Sw),
            self.child(Quadrant::Se),
        ]
    }
}
