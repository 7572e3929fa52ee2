use rust_decimal::Decimal;

use crate::error::{PointIndexError, Result};
use crate::knn::BoundedPriorityQueue;
use crate::point::Point;
use crate::quadtree::node::{BlackNode, QuadNode};
use crate::quadtree::traversal::NodeRef;

/// The largest accepted space exponent. `2^60` already exceeds any realistic
/// coordinate range while keeping side lengths exactly representable.
const MAX_SPACE_EXPONENT: i32 = 60;

/// A point-region quadtree over 2-D exact-coordinate points.
///
/// The tree spans the square of side `2^exponent` centered on the origin and
/// recursively subdivides it into four quadrants until every leaf holds at
/// most `bucket` points. Leaves ("black" nodes) split into internal ("gray")
/// nodes on overflow, and gray nodes collapse back into leaves when a
/// deletion leaves their collective contents at or below the bucket size.
///
/// The tree stores a *set* of points: inserting a point already present is a
/// no-op. Points exactly on a quadrant boundary are routed to the
/// greater-or-equal side.
#[derive(Debug, Clone)]
pub struct PrQuadTree {
    root: Option<QuadNode>,
    exponent: i32,
    bucket: usize,
    len: usize,
}

impl PrQuadTree {
    const DIMS: usize = 2;

    /// Create an empty tree spanning the square of side `2^space_exponent`
    /// centered on the origin, with leaves holding up to `bucket` points.
    ///
    /// Returns an error when the exponent is non-positive or implausibly
    /// large, or when the bucket size is zero.
    pub fn new(space_exponent: i32, bucket: usize) -> Result<Self> {
        if !(1..=MAX_SPACE_EXPONENT).contains(&space_exponent) {
            return Err(PointIndexError::InvalidConfig(format!(
                "space exponent {} is outside 1..={}",
                space_exponent, MAX_SPACE_EXPONENT
            )));
        }
        if bucket == 0 {
            return Err(PointIndexError::InvalidConfig(
                "leaves need a positive bucket size".to_string(),
            ));
        }
        Ok(Self {
            root: None,
            exponent: space_exponent,
            bucket,
            len: 0,
        })
    }

    /// The exponent defining the side length (`2^exponent`) of the spanned
    /// square.
    pub fn space_exponent(&self) -> i32 {
        self.exponent
    }

    /// The maximum number of points a leaf may hold.
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// The number of points currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The height of the tree: -1 when empty, 0 for a single leaf.
    pub fn height(&self) -> i32 {
        self.root.as_ref().map_or(-1, QuadNode::height)
    }

    /// Access the root node for manual traversal, e.g. by a serializer.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.as_ref().map(NodeRef::new)
    }

    fn check_dims(&self, point: &Point) -> Result<()> {
        if point.dims() != Self::DIMS {
            return Err(PointIndexError::DimensionMismatch {
                expected: Self::DIMS,
                actual: point.dims(),
            });
        }
        Ok(())
    }

    /// Insert a point into the tree. Inserting a point already present is a
    /// no-op.
    pub fn insert(&mut self, point: Point) -> Result<()> {
        self.check_dims(&point)?;
        if self.search(&point)? {
            return Ok(());
        }
        self.root = Some(match self.root.take() {
            Some(root) => root.insert(point, self.bucket),
            None => QuadNode::Black(BlackNode::new(Point::default(), self.exponent, point)),
        });
        self.len += 1;
        Ok(())
    }

    /// Delete a point from the tree. Deleting an absent point is a no-op.
    pub fn delete(&mut self, point: &Point) -> Result<()> {
        self.check_dims(point)?;
        if self.search(point)? {
            self.root = self
                .root
                .take()
                .and_then(|root| root.delete(point, self.bucket));
            self.len -= 1;
        }
        Ok(())
    }

    /// Whether the exact point is stored in the tree.
    pub fn search(&self, point: &Point) -> Result<bool> {
        self.check_dims(point)?;
        Ok(self.root.as_ref().is_some_and(|root| root.search(point)))
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
            root.range(anchor, radius, &mut results);
        }
        Ok(results)
    }

    /// The stored point closest to `anchor`, excluding the anchor itself, or
    /// `None` when no other point is stored.
    pub fn nearest_neighbor(&self, anchor: &Point) -> Result<Option<Point>> {
        self.check_dims(anchor)?;
        let mut best = None;
        if let Some(root) = &self.root {
            root.nearest_neighbor(anchor, &mut best);
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
            root.k_nearest_neighbors(k, anchor, &mut queue);
        }
        Ok(queue.into_iter().collect())
    }
}
