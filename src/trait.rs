//! Common interfaces implemented by both spatial indexes.

#![warn(missing_docs)]

use rust_decimal::Decimal;

use crate::error::Result;
use crate::kdtree::KdTree;
use crate::point::Point;
use crate::quadtree::PrQuadTree;

/// A dictionary of points in Euclidean space: exact storage, membership
/// search and structural accessors.
pub trait SpatialDictionary {
    /// Insert a point into the container.
    fn insert(&mut self, point: Point) -> Result<()>;

    /// Delete a point from the container. Deleting an absent point is a
    /// no-op.
    fn delete(&mut self, point: &Point) -> Result<()>;

    /// Whether the exact point is stored in the container.
    fn search(&self, point: &Point) -> Result<bool>;

    /// The height of the underlying tree: -1 when empty.
    fn height(&self) -> i32;

    /// The number of points currently stored.
    fn len(&self) -> usize;

    /// Whether the container holds no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spatial queries over a dictionary of points: radius and (k-)nearest
/// neighbor searches anchored at an arbitrary point.
pub trait SpatialQuerySolver {
    /// Collect every stored point within `radius` of `anchor`, inclusive,
    /// excluding the anchor itself. The order of the result is unspecified.
    fn range(&self, anchor: &Point, radius: Decimal) -> Result<Vec<Point>>;

    /// The stored point closest to `anchor`, excluding the anchor itself, or
    /// `None` when no other point is stored.
    fn nearest_neighbor(&self, anchor: &Point) -> Result<Option<Point>>;

    /// The k stored points closest to `anchor`, nearest first, excluding the
    /// anchor itself.
    fn k_nearest_neighbors(&self, k: usize, anchor: &Point) -> Result<Vec<Point>>;
}

impl SpatialDictionary for KdTree {
    fn insert(&mut self, point: Point) -> Result<()> {
        KdTree::insert(self, point)
    }

    fn delete(&mut self, point: &Point) -> Result<()> {
        KdTree::delete(self, point)
    }

    fn search(&self, point: &Point) -> Result<bool> {
        KdTree::search(self, point)
    }

    fn height(&self) -> i32 {
        KdTree::height(self)
    }

    fn len(&self) -> usize {
        KdTree::len(self)
    }
}

impl SpatialQuerySolver for KdTree {
    fn range(&self, anchor: &Point, radius: Decimal) -> Result<Vec<Point>> {
        KdTree::range(self, anchor, radius)
    }

    fn nearest_neighbor(&self, anchor: &Point) -> Result<Option<Point>> {
        KdTree::nearest_neighbor(self, anchor)
    }

    fn k_nearest_neighbors(&self, k: usize, anchor: &Point) -> Result<Vec<Point>> {
        KdTree::k_nearest_neighbors(self, k, anchor)
    }
}

impl SpatialDictionary for PrQuadTree {
    fn insert(&mut self, point: Point) -> Result<()> {
        PrQuadTree::insert(self, point)
    }

    fn delete(&mut self, point: &Point) -> Result<()> {
        PrQuadTree::delete(self, point)
    }

    fn search(&self, point: &Point) -> Result<bool> {
        PrQuadTree::search(self, point)
    }

    fn height(&self) -> i32 {
        PrQuadTree::height(self)
    }

    fn len(&self) -> usize {
        PrQuadTree::len(self)
    }
}

impl SpatialQuerySolver for PrQuadTree {
    fn range(&self, anchor: &Point, radius: Decimal) -> Result<Vec<Point>> {
        PrQuadTree::range(self, anchor, radius)
    }

    fn nearest_neighbor(&self, anchor: &Point) -> Result<Option<Point>> {
        PrQuadTree::nearest_neighbor(self, anchor)
    }

    fn k_nearest_neighbors(&self, k: usize, anchor: &Point) -> Result<Vec<Point>> {
        PrQuadTree::k_nearest_neighbors(self, k, anchor)
    }
}
