use rust_decimal::Decimal;

use crate::error::{PointIndexError, Result};
use crate::kdtree::node::KdNode;
use crate::kdtree::traversal::NodeRef;
use crate::knn::BoundedPriorityQueue;
use crate::point::Point;

/// A k-dimensional binary search tree over exact-coordinate points.
///
/// The tree acts as a BST over one dimension per level, cycling through the
/// dimensions with depth. It supports exact insertion, deletion and
/// membership search, plus radius ("range") and (k-)nearest-neighbor queries
/// with branch-and-bound pruning. The shape is purely determined by the
/// insertion order; no rebalancing is performed.
///
/// All operations taking a point reject dimensionality mismatches before
/// touching the structure.
#[derive(Debug, Clone)]
pub struct KdTree {
    root: Option<Box<KdNode>>,
    dims: usize,
    len: usize,
}

impl KdTree {
    /// Create an empty tree over `dims`-dimensional points.
    ///
    /// Returns an error when `dims` is zero.
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 {
            return Err(PointIndexError::InvalidConfig(
                "trees need a positive dimensionality".to_string(),
            ));
        }
        Ok(Self {
            root: None,
            dims,
            len: 0,
        })
    }

    /// The dimensionality of the space this tree indexes.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The number of points currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The height of the tree: -1 when empty, 0 for a single node.
    pub fn height(&self) -> i32 {
        self.root.as_ref().map_or(-1, |root| root.height())
    }

    /// The point at the root of the tree, or [`PointIndexError::EmptyTree`].
    pub fn root_point(&self) -> Result<Point> {
        self.root
            .as_ref()
            .map(|root| root.point().clone())
            .ok_or(PointIndexError::EmptyTree)
    }

    /// Access the root node for manual traversal, e.g. by a serializer.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.as_deref().map(NodeRef::new)
    }

    fn check_dims(&self, point: &Point) -> Result<()> {
        if point.dims() != self.dims {
            return Err(PointIndexError::DimensionMismatch {
                expected: self.dims,
                actual: point.dims(),
            });
        }
        Ok(())
    }

    /// Insert a point into the tree.
    pub fn insert(&mut self, point: Point) -> Result<()> {
        self.check_dims(&point)?;
        match &mut self.root {
            Some(root) => root.insert(point, 0, self.dims),
            None => self.root = Some(Box::new(KdNode::new(point))),
        }
        self.len += 1;
        Ok(())
    }

    /// Delete a point from the tree. Deleting an absent point is a no-op.
    pub fn delete(&mut self, point: &Point) -> Result<()> {
        self.check_dims(point)?;
        if self
            .root
            .as_ref()
            .is_some_and(|root| root.search(point, 0, self.dims))
        {
            self.root = self
                .root
                .take()
                .and_then(|root| root.delete(point, 0, self.dims));
            self.len -= 1;
        }
        Ok(())
    }

    /// Whether the exact point is stored in the tree.
    pub fn search(&self, point: &Point) -> Result<bool> {
        self.check_dims(point)?;
        Ok(self
            .root
            .as_ref()
            .is_some_and(|root| root.search(point, 0, self.dims)))
    }

    /// Collect every stored point within `radius` of `anchor`, inclusive,
    /// excluding the anchor itself. The order of the result is unspecified.
    pub fn range(&self, anchor: &Point, radius: Decimal) -> Result<Vec<Point>> {
        self.check_dims(anchor)?;
        let mut results = Vec::new();
        if radius.is_sign_negative() {
            return Ok(results);
        }
        if let Some(root) = &self.root {
            root.range(anchor, radius, 0, self.dims, &mut results);
        }
        Ok(results)
    }

    /// The stored point closest to `anchor`, excluding the anchor itself, or
    /// `None` when no other point is stored.
    pub fn nearest_neighbor(&self, anchor: &Point) -> Result<Option<Point>> {
        self.check_dims(anchor)?;
        let mut best = None;
        if let Some(root) = &self.root {
            root.nearest_neighbor(anchor, 0, self.dims, &mut best);
        }
        Ok(best.map(|nearest| nearest.point))
    }

    /// The k stored points closest to `anchor`, nearest first, excluding the
    /// anchor itself. Fewer than k points are returned when the tree holds
    /// fewer. Returns an error when `k` is zero.
    pub fn k_nearest_neighbors(&self, k: usize, anchor: &Point) -> Result<Vec<Point>> {
        self.check_dims(anchor)?;
        let mut queue = BoundedPriorityQueue::new(k)?;
        if let Some(root) = &self.root {
            root.k_nearest_neighbors(k, anchor, 0, self.dims, &mut queue);
        }
        Ok(queue.into_iter().collect())
    }
}

/// An empty 2-D tree.
impl Default for KdTree {
    fn default() -> Self {
        Self {
            root: None,
            dims: 2,
            len: 0,
        }
    }
}
