use log::trace;
use rust_decimal::Decimal;

use crate::knn::{BoundedPriorityQueue, Nearest};
use crate::point::{sq_dist, Point};

/// A node of the discriminated tree: one point, two optional subtrees and a
/// cached subtree height.
///
/// Which subtree a point belongs to is decided by the discriminating
/// dimension, `depth mod k`: a coordinate smaller than the node's goes left, a
/// greater-or-equal one goes right. Every mutating operation recomputes the
/// cached height on the way back up.
#[derive(Debug, Clone)]
pub(crate) struct KdNode {
    point: Point,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
    height: i32,
}

impl KdNode {
    pub(crate) fn new(point: Point) -> Self {
        Self {
            point,
            left: None,
            right: None,
            height: 0,
        }
    }

    pub(crate) fn point(&self) -> &Point {
        &self.point
    }

    pub(crate) fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    pub(crate) fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    fn child_height(child: &Option<Box<KdNode>>) -> i32 {
        child.as_ref().map_or(-1, |node| node.height)
    }

    fn update_height(&mut self) {
        self.height = 1 + Self::child_height(&self.left).max(Self::child_height(&self.right));
    }

    /// Insert `point` into the subtree rooted at this node.
    ///
    /// Acts as a BST over `cur_dim`: a greater-or-equal coordinate recurses
    /// right, a smaller one left, cycling dimensions with depth. The tree's
    /// shape is purely insertion-order-determined; there is no rebalancing.
    pub(crate) fn insert(&mut self, point: Point, cur_dim: usize, dims: usize) {
        let next_dim = (cur_dim + 1) % dims;
        if point.coord(cur_dim) >= self.point.coord(cur_dim) {
            match &mut self.right {
                Some(right) => right.insert(point, next_dim, dims),
                None => self.right = Some(Box::new(KdNode::new(point))),
            }
        } else {
            match &mut self.left {
                Some(left) => left.insert(point, next_dim, dims),
                None => self.left = Some(Box::new(KdNode::new(point))),
            }
        }
        self.update_height();
    }

    /// Delete `target` from the subtree rooted at this node, returning the
    /// possibly-different new subtree root.
    ///
    /// A matching node with a right subtree is overwritten with that subtree's
    /// minimum point along `cur_dim`, which is then deleted from it. A
    /// matching node with only a left subtree borrows its replacement from the
    /// left instead; the remaining left subtree is re-parented as the new
    /// right subtree, since everything in it is greater-or-equal to the
    /// promoted minimum on `cur_dim`. A matching leaf simply disappears.
    pub(crate) fn delete(
        mut self: Box<Self>,
        target: &Point,
        cur_dim: usize,
        dims: usize,
    ) -> Option<Box<KdNode>> {
        let next_dim = (cur_dim + 1) % dims;
        if self.point == *target {
            if let Some(right) = self.right.take() {
                let replacement = right.min_along(cur_dim, next_dim, dims);
                self.right = right.delete(&replacement, next_dim, dims);
                self.point = replacement;
            } else if let Some(left) = self.left.take() {
                trace!(
                    "deleting {}: re-parenting the left subtree as the right",
                    self.point
                );
                let replacement = left.min_along(cur_dim, next_dim, dims);
                self.right = left.delete(&replacement, next_dim, dims);
                self.point = replacement;
            } else {
                return None;
            }
        } else if target.coord(cur_dim) >= self.point.coord(cur_dim) {
            self.right = self
                .right
                .take()
                .and_then(|right| right.delete(target, next_dim, dims));
        } else {
            self.left = self
                .left
                .take()
                .and_then(|left| left.delete(target, next_dim, dims));
        }
        self.update_height();
        Some(self)
    }

    /// The point with the minimum coordinate along `sought_dim` in the
    /// subtree rooted at this node.
    ///
    /// When the node discriminates on the sought dimension itself, the
    /// minimum can only live in the left subtree. Otherwise all three of the
    /// node and both subtree minima are candidates; ties keep the earlier
    /// candidate, preferring the node, then the left result, then the right.
    fn min_along(&self, sought_dim: usize, cur_dim: usize, dims: usize) -> Point {
        let next_dim = (cur_dim + 1) % dims;
        if sought_dim == cur_dim {
            match &self.left {
                Some(left) => left.min_along(sought_dim, next_dim, dims),
                None => self.point.clone(),
            }
        } else {
            let mut best = self.point.clone();
            if let Some(left) = &self.left {
                let candidate = left.min_along(sought_dim, next_dim, dims);
                if candidate.coord(sought_dim) < best.coord(sought_dim) {
                    best = candidate;
                }
            }
            if let Some(right) = &self.right {
                let candidate = right.min_along(sought_dim, next_dim, dims);
                if candidate.coord(sought_dim) < best.coord(sought_dim) {
                    best = candidate;
                }
            }
            best
        }
    }

    /// Whether `target` is stored in the subtree rooted at this node.
    pub(crate) fn search(&self, target: &Point, cur_dim: usize, dims: usize) -> bool {
        let next_dim = (cur_dim + 1) % dims;
        if self.point == *target {
            true
        } else if target.coord(cur_dim) >= self.point.coord(cur_dim) {
            self.right
                .as_ref()
                .is_some_and(|right| right.search(target, next_dim, dims))
        } else {
            self.left
                .as_ref()
                .is_some_and(|left| left.search(target, next_dim, dims))
        }
    }

    /// Collect every stored point except the anchor whose distance to
    /// `anchor` is at most `radius`, inclusive.
    ///
    /// The inclusion test compares exact squared quantities. A subtree is
    /// skipped only when the coordinate gap along `cur_dim` alone already
    /// exceeds the radius; a node strictly inside the ball descends into both
    /// children unconditionally.
    pub(crate) fn range(
        &self,
        anchor: &Point,
        radius: Decimal,
        cur_dim: usize,
        dims: usize,
        results: &mut Vec<Point>,
    ) {
        let next_dim = (cur_dim + 1) % dims;
        let dist_sq = sq_dist(&self.point, anchor);
        let radius_sq = radius * radius;
        if dist_sq >= radius_sq {
            // On or outside the rim: report an exact rim hit, then descend
            // into whichever sides the axis gap cannot rule out.
            if dist_sq == radius_sq && self.point != *anchor {
                results.push(self.point.clone());
            }
            let gap = self.point.coord(cur_dim) - anchor.coord(cur_dim);
            if gap <= radius {
                if let Some(right) = &self.right {
                    right.range(anchor, radius, next_dim, dims, results);
                }
            }
            if gap >= -radius {
                if let Some(left) = &self.left {
                    left.range(anchor, radius, next_dim, dims, results);
                }
            }
        } else {
            if self.point != *anchor {
                results.push(self.point.clone());
            }
            if let Some(left) = &self.left {
                left.range(anchor, radius, next_dim, dims, results);
            }
            if let Some(right) = &self.right {
                right.range(anchor, radius, next_dim, dims, results);
            }
        }
    }

    /// Branch-and-bound search for the stored point closest to `anchor`,
    /// excluding the anchor itself.
    ///
    /// Descends the side the anchor falls on first, then visits the other
    /// side only if the ball around the anchor through the current best could
    /// cross this node's splitting hyperplane. The crossing test compares the
    /// squared axis gap against the squared best distance, which is exact and
    /// equivalent to comparing the gap against the rooted distance.
    pub(crate) fn nearest_neighbor(
        &self,
        anchor: &Point,
        cur_dim: usize,
        dims: usize,
        best: &mut Option<Nearest>,
    ) {
        let next_dim = (cur_dim + 1) % dims;
        if self.point != *anchor {
            let dist_sq = sq_dist(&self.point, anchor);
            if best.as_ref().map_or(true, |b| dist_sq < b.dist_sq) {
                *best = Some(Nearest {
                    point: self.point.clone(),
                    dist_sq,
                });
            }
        }
        let likely_right =
            self.point.coord(cur_dim) <= anchor.coord(cur_dim) && self.right.is_some();
        let (picked, other) = if likely_right {
            (&self.right, &self.left)
        } else {
            (&self.left, &self.right)
        };
        if let Some(node) = picked {
            node.nearest_neighbor(anchor, next_dim, dims, best);
        }
        if let Some(node) = other {
            let gap = (self.point.coord(cur_dim) - anchor.coord(cur_dim)).abs();
            if best.as_ref().map_or(true, |b| gap * gap <= b.dist_sq) {
                node.nearest_neighbor(anchor, next_dim, dims, best);
            }
        }
    }

    /// Offer every non-anchor point in the subtree to `queue`, pruning
    /// subtrees that provably cannot improve on the queue's worst entry.
    ///
    /// While the queue is below capacity both sides are always visited; once
    /// full, the off side is visited only if the splitting hyperplane is
    /// within the distance of the worst retained neighbor.
    pub(crate) fn k_nearest_neighbors(
        &self,
        k: usize,
        anchor: &Point,
        cur_dim: usize,
        dims: usize,
        queue: &mut BoundedPriorityQueue<Point>,
    ) {
        let next_dim = (cur_dim + 1) % dims;
        if self.point != *anchor {
            queue.enqueue(self.point.clone(), sq_dist(&self.point, anchor));
        }
        let (picked, other) = if self.point.coord(cur_dim) <= anchor.coord(cur_dim) {
            (&self.right, &self.left)
        } else {
            (&self.left, &self.right)
        };
        if let Some(node) = picked {
            node.k_nearest_neighbors(k, anchor, next_dim, dims, queue);
        }
        if let Some(node) = other {
            let gap = (self.point.coord(cur_dim) - anchor.coord(cur_dim)).abs();
            let must_visit = queue.len() < k
                || queue
                    .last()
                    .map_or(true, |worst| gap * gap <= sq_dist(anchor, worst));
            if must_visit {
                node.k_nearest_neighbors(k, anchor, next_dim, dims, queue);
            }
        }
    }
}
