use log::trace;
use rust_decimal::Decimal;
use tinyvec::TinyVec;

use crate::knn::{BoundedPriorityQueue, Nearest};
use crate::point::{sq_dist, Point};

/// The four quadrants of a subdivided region, in Z order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// North-west: x below the centroid's, y at or above.
    Nw = 0,
    /// North-east: x at or above the centroid's, y at or above.
    Ne = 1,
    /// South-west: x below the centroid's, y below.
    Sw = 2,
    /// South-east: x at or above the centroid's, y below.
    Se = 3,
}

impl Quadrant {
    /// All four quadrants in Z order.
    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    /// The quadrant of `point` relative to `centroid`.
    ///
    /// Points exactly on the centroid's x line go to the easterly side, and
    /// points exactly on its y line go to the northerly side.
    pub(crate) fn of(centroid: &Point, point: &Point) -> Quadrant {
        let west = point.coord(0) < centroid.coord(0);
        let north = point.coord(1) >= centroid.coord(1);
        match (west, north) {
            (true, true) => Quadrant::Nw,
            (false, true) => Quadrant::Ne,
            (true, false) => Quadrant::Sw,
            (false, false) => Quadrant::Se,
        }
    }

    /// All quadrants starting from `first`, the rest in Z order.
    fn order_from(first: Quadrant) -> impl Iterator<Item = Quadrant> {
        std::iter::once(first).chain(Self::ALL.into_iter().filter(move |q| *q != first))
    }

    /// Unit offsets of this quadrant's centroid relative to its parent's.
    fn signs(self) -> (Decimal, Decimal) {
        match self {
            Quadrant::Nw => (-Decimal::ONE, Decimal::ONE),
            Quadrant::Ne => (Decimal::ONE, Decimal::ONE),
            Quadrant::Sw => (-Decimal::ONE, -Decimal::ONE),
            Quadrant::Se => (Decimal::ONE, -Decimal::ONE),
        }
    }
}

/// `2^exp` as an exact decimal. Negative exponents halve down from one and
/// stay exact until the decimal scale limit.
pub(crate) fn power_of_two(exp: i32) -> Decimal {
    if exp >= 0 {
        Decimal::from(1u64 << exp)
    } else {
        let mut value = Decimal::ONE;
        for _ in 0..-exp {
            value /= Decimal::TWO;
        }
        value
    }
}

/// A node of the region quadtree: either a leaf bucket of points ("black") or
/// an internal node with four child slots ("gray"). An absent slot is the
/// conceptual "white" node.
///
/// Insertion and deletion consume the node and return its replacement, so a
/// black node can legitimately become gray on overflow and a gray node can
/// collapse back to black on underflow.
#[derive(Debug, Clone)]
pub(crate) enum QuadNode {
    Black(BlackNode),
    Gray(Box<GrayNode>),
}

/// A leaf holding between one and `bucket` points.
///
/// A black node never holds zero points: deleting its last point removes the
/// node itself.
#[derive(Debug, Clone)]
pub(crate) struct BlackNode {
    centroid: Point,
    exponent: i32,
    points: TinyVec<[Point; 4]>,
}

/// An internal node with exactly four child slots in Z order.
///
/// The centroid and side exponent fully determine each child quadrant: the
/// child centroid is offset by `±2^(exponent-2)` on each axis and the child
/// side exponent is one less. A gray node always either holds a gray child or
/// more points, collectively, than the bucketing parameter; anything less is
/// collapsed into a single black node on deletion.
#[derive(Debug, Clone)]
pub(crate) struct GrayNode {
    centroid: Point,
    exponent: i32,
    height: i32,
    children: [Option<QuadNode>; 4],
}

impl BlackNode {
    pub(crate) fn new(centroid: Point, exponent: i32, point: Point) -> Self {
        let mut points = TinyVec::new();
        points.push(point);
        Self {
            centroid,
            exponent,
            points,
        }
    }

    pub(crate) fn centroid(&self) -> &Point {
        &self.centroid
    }

    pub(crate) fn exponent(&self) -> i32 {
        self.exponent
    }

    pub(crate) fn points(&self) -> &[Point] {
        &self.points
    }

    /// Append the point, or split into a gray node when already at the bucket
    /// capacity. Splitting re-inserts every held point and then the incoming
    /// one; it cascades as long as all of them still crowd a single quadrant.
    fn insert(mut self, point: Point, bucket: usize) -> QuadNode {
        if self.points.len() == bucket {
            trace!(
                "splitting black node at {} (side 2^{})",
                self.centroid,
                self.exponent
            );
            let mut gray = GrayNode::new(self.centroid, self.exponent);
            for held in self.points {
                gray.insert(held, bucket);
            }
            gray.insert(point, bucket);
            QuadNode::Gray(Box::new(gray))
        } else {
            self.points.push(point);
            QuadNode::Black(self)
        }
    }

    /// Remove the point if present, preserving the order of the remainder.
    /// Removing the last point removes the node itself; an absent point is a
    /// no-op.
    fn delete(mut self, point: &Point) -> Option<QuadNode> {
        if self.points.len() == 1 && self.points[0] == *point {
            return None;
        }
        if let Some(index) = self.points.iter().position(|held| held == point) {
            self.points.remove(index);
        }
        Some(QuadNode::Black(self))
    }
}

impl GrayNode {
    fn new(centroid: Point, exponent: i32) -> Self {
        Self {
            centroid,
            exponent,
            height: 0,
            children: [None, None, None, None],
        }
    }

    pub(crate) fn centroid(&self) -> &Point {
        &self.centroid
    }

    pub(crate) fn exponent(&self) -> i32 {
        self.exponent
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn child(&self, quadrant: Quadrant) -> Option<&QuadNode> {
        self.children[quadrant as usize].as_ref()
    }

    fn child_centroid(&self, quadrant: Quadrant) -> Point {
        let offset = power_of_two(self.exponent - 2);
        let (sx, sy) = quadrant.signs();
        Point::xy(
            self.centroid.coord(0) + sx * offset,
            self.centroid.coord(1) + sy * offset,
        )
    }

    fn update_height(&mut self) {
        self.height = 1 + self
            .children
            .iter()
            .map(|child| child.as_ref().map_or(-1, QuadNode::height))
            .max()
            .unwrap_or(-1);
    }

    /// Route the point to its quadrant, creating a fresh black child when the
    /// slot is empty and recursing otherwise. A black child may come back
    /// gray.
    fn insert(&mut self, point: Point, bucket: usize) {
        let quadrant = Quadrant::of(&self.centroid, &point);
        let child_centroid = self.child_centroid(quadrant);
        let slot = &mut self.children[quadrant as usize];
        *slot = Some(match slot.take() {
            Some(child) => child.insert(point, bucket),
            None => QuadNode::Black(BlackNode::new(
                child_centroid,
                self.exponent - 1,
                point,
            )),
        });
        self.update_height();
    }

    /// Route the deletion to its quadrant, then collapse this node into a
    /// single black node if no gray child remains and the surviving points
    /// all fit in one bucket.
    fn delete(mut self: Box<Self>, point: &Point, bucket: usize) -> Option<QuadNode> {
        let quadrant = Quadrant::of(&self.centroid, point);
        match self.children[quadrant as usize].take() {
            Some(child) => self.children[quadrant as usize] = child.delete(point, bucket),
            None => return Some(QuadNode::Gray(self)),
        }
        let any_gray = self
            .children
            .iter()
            .flatten()
            .any(|child| matches!(child, QuadNode::Gray(_)));
        let total: usize = self.children.iter().flatten().map(QuadNode::count).sum();
        if !any_gray && total <= bucket {
            trace!(
                "collapsing gray node at {} back into a black node",
                self.centroid
            );
            let mut points: TinyVec<[Point; 4]> = TinyVec::new();
            for slot in &mut self.children {
                if let Some(QuadNode::Black(black)) = slot.take() {
                    points.extend(black.points);
                }
            }
            debug_assert!(!points.is_empty());
            Some(QuadNode::Black(BlackNode {
                centroid: self.centroid,
                exponent: self.exponent,
                points,
            }))
        } else {
            self.update_height();
            Some(QuadNode::Gray(self))
        }
    }
}

impl QuadNode {
    /// Insert the point in the subtree rooted at this node, returning the
    /// updated subtree.
    pub(crate) fn insert(self, point: Point, bucket: usize) -> QuadNode {
        match self {
            QuadNode::Black(black) => black.insert(point, bucket),
            QuadNode::Gray(mut gray) => {
                gray.insert(point, bucket);
                QuadNode::Gray(gray)
            }
        }
    }

    /// Delete the point from the subtree rooted at this node, returning the
    /// updated subtree or `None` when the subtree vanishes.
    pub(crate) fn delete(self, point: &Point, bucket: usize) -> Option<QuadNode> {
        match self {
            QuadNode::Black(black) => black.delete(point),
            QuadNode::Gray(gray) => gray.delete(point, bucket),
        }
    }

    /// Whether the exact point is stored in the subtree rooted at this node.
    pub(crate) fn search(&self, point: &Point) -> bool {
        match self {
            QuadNode::Black(black) => black.points.iter().any(|held| held == point),
            QuadNode::Gray(gray) => {
                let quadrant = Quadrant::of(&gray.centroid, point);
                gray.children[quadrant as usize]
                    .as_ref()
                    .is_some_and(|child| child.search(point))
            }
        }
    }

    /// The height of the subtree rooted at this node; a leaf has height 0.
    pub(crate) fn height(&self) -> i32 {
        match self {
            QuadNode::Black(_) => 0,
            QuadNode::Gray(gray) => gray.height,
        }
    }

    /// The number of points stored in the subtree rooted at this node.
    pub(crate) fn count(&self) -> usize {
        match self {
            QuadNode::Black(black) => black.points.len(),
            QuadNode::Gray(gray) => gray.children.iter().flatten().map(QuadNode::count).sum(),
        }
    }

    fn centroid(&self) -> &Point {
        match self {
            QuadNode::Black(black) => &black.centroid,
            QuadNode::Gray(gray) => &gray.centroid,
        }
    }

    fn exponent(&self) -> i32 {
        match self {
            QuadNode::Black(black) => black.exponent,
            QuadNode::Gray(gray) => gray.exponent,
        }
    }

    /// Exact circle/square intersection between this node's quadrant and the
    /// ball of squared radius `radius_sq` around `anchor`: clamp the centroid
    /// deltas by the half-side, then compare the remaining corner distance
    /// against the radius.
    fn quadrant_intersects(&self, anchor: &Point, radius_sq: Decimal) -> bool {
        let half = power_of_two(self.exponent() - 1);
        let dx = (anchor.coord(0) - self.centroid().coord(0)).abs();
        let dy = (anchor.coord(1) - self.centroid().coord(1)).abs();
        let ex = (dx - half).max(Decimal::ZERO);
        let ey = (dy - half).max(Decimal::ZERO);
        ex * ex + ey * ey <= radius_sq
    }

    /// Collect every stored point except the anchor whose distance to
    /// `anchor` is at most `radius`, inclusive. Children whose quadrant does
    /// not meet the query ball are skipped.
    pub(crate) fn range(&self, anchor: &Point, radius: Decimal, results: &mut Vec<Point>) {
        match self {
            QuadNode::Black(black) => {
                let radius_sq = radius * radius;
                for point in &black.points {
                    if point != anchor && sq_dist(point, anchor) <= radius_sq {
                        results.push(point.clone());
                    }
                }
            }
            QuadNode::Gray(gray) => {
                let radius_sq = radius * radius;
                for child in gray.children.iter().flatten() {
                    if child.quadrant_intersects(anchor, radius_sq) {
                        child.range(anchor, radius, results);
                    }
                }
            }
        }
    }

    /// Branch-and-bound search for the stored point closest to `anchor`,
    /// excluding the anchor itself. The anchor's own quadrant is visited
    /// first; the others only while they can still beat the current best.
    pub(crate) fn nearest_neighbor(&self, anchor: &Point, best: &mut Option<Nearest>) {
        match self {
            QuadNode::Black(black) => {
                for point in &black.points {
                    if point == anchor {
                        continue;
                    }
                    let dist_sq = sq_dist(point, anchor);
                    if best.as_ref().map_or(true, |b| dist_sq < b.dist_sq) {
                        *best = Some(Nearest {
                            point: point.clone(),
                            dist_sq,
                        });
                    }
                }
            }
            QuadNode::Gray(gray) => {
                let first = Quadrant::of(&gray.centroid, anchor);
                for quadrant in Quadrant::order_from(first) {
                    if let Some(child) = &gray.children[quadrant as usize] {
                        let worth_visiting = best
                            .as_ref()
                            .map_or(true, |b| child.quadrant_intersects(anchor, b.dist_sq));
                        if worth_visiting {
                            child.nearest_neighbor(anchor, best);
                        }
                    }
                }
            }
        }
    }

    /// Offer every non-anchor point in the subtree to `queue`, pruning
    /// quadrants that cannot improve on the queue's worst entry once it is
    /// full.
    pub(crate) fn k_nearest_neighbors(
        &self,
        k: usize,
        anchor: &Point,
        queue: &mut BoundedPriorityQueue<Point>,
    ) {
        match self {
            QuadNode::Black(black) => {
                for point in &black.points {
                    if point != anchor {
                        queue.enqueue(point.clone(), sq_dist(point, anchor));
                    }
                }
            }
            QuadNode::Gray(gray) => {
                let first = Quadrant::of(&gray.centroid, anchor);
                for quadrant in Quadrant::order_from(first) {
                    if let Some(child) = &gray.children[quadrant as usize] {
                        let must_visit = queue.len() < k
                            || queue.last().map_or(true, |worst| {
                                child.quadrant_intersects(anchor, sq_dist(anchor, worst))
                            });
                        if must_visit {
                            child.k_nearest_neighbors(k, anchor, queue);
                        }
                    }
                }
            }
        }
    }
}
