use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::error::PointIndexError;
use crate::kdtree::{KdTree, NodeRef};
use crate::point::{sq_dist, Point};

fn pt(coords: &[i64]) -> Point {
    Point::new(coords.iter().map(|c| Decimal::from(*c)).collect()).unwrap()
}

fn distinct_points(rng: &mut StdRng, n: usize, dims: usize, span: i64) -> Vec<Point> {
    let mut points = Vec::new();
    let mut seen = HashSet::new();
    while points.len() < n {
        let coords: Vec<i64> = (0..dims).map(|_| rng.gen_range(-span..=span)).collect();
        let point = pt(&coords);
        if seen.insert(point.clone()) {
            points.push(point);
        }
    }
    points
}

/// Distinct points whose squared distances to `anchor` are pairwise unique,
/// so nearest-neighbor orderings have no ties.
fn points_with_unique_distances(
    rng: &mut StdRng,
    n: usize,
    dims: usize,
    span: i64,
    anchor: &Point,
) -> Vec<Point> {
    let mut points = Vec::new();
    let mut dists = HashSet::new();
    while points.len() < n {
        let coords: Vec<i64> = (0..dims).map(|_| rng.gen_range(-span..=span)).collect();
        let point = pt(&coords);
        if point == *anchor {
            continue;
        }
        if dists.insert(sq_dist(&point, anchor)) {
            points.push(point);
        }
    }
    points
}

fn subtree_points(node: NodeRef<'_>, out: &mut Vec<Point>) {
    out.push(node.point().clone());
    if let Some(left) = node.left() {
        subtree_points(left, out);
    }
    if let Some(right) = node.right() {
        subtree_points(right, out);
    }
}

/// Check the discrimination and cached-height invariants for every node of
/// the subtree, returning its height.
fn assert_node_invariants(node: NodeRef<'_>, depth: usize, dims: usize) -> i32 {
    let dim = depth % dims;
    let pivot = node.point().coord(dim);
    let mut left_height = -1;
    if let Some(left) = node.left() {
        let mut points = Vec::new();
        subtree_points(left, &mut points);
        for point in &points {
            assert!(
                point.coord(dim) < pivot,
                "left subtree point {} not below {} on dim {}",
                point,
                node.point(),
                dim
            );
        }
        left_height = assert_node_invariants(left, depth + 1, dims);
    }
    let mut right_height = -1;
    if let Some(right) = node.right() {
        let mut points = Vec::new();
        subtree_points(right, &mut points);
        for point in &points {
            assert!(
                point.coord(dim) >= pivot,
                "right subtree point {} below {} on dim {}",
                point,
                node.point(),
                dim
            );
        }
        right_height = assert_node_invariants(right, depth + 1, dims);
    }
    let height = 1 + left_height.max(right_height);
    assert_eq!(node.height(), height, "stale height at {}", node.point());
    height
}

fn assert_invariants(tree: &KdTree) {
    if let Some(root) = tree.root() {
        assert_eq!(tree.height(), assert_node_invariants(root, 0, tree.dims()));
    } else {
        assert_eq!(tree.height(), -1);
    }
}

fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| a.coords().cmp(b.coords()));
    points
}

#[test]
fn one_dimensional_range_query() {
    let mut tree = KdTree::new(1).unwrap();
    for value in [15, -20, -10, 30, 20, 30] {
        tree.insert(pt(&[value])).unwrap();
    }
    assert_eq!(tree.len(), 6);

    // 15 sits exactly on the rim and is included; the anchor itself is not.
    let result = tree.range(&pt(&[-20]), Decimal::from(35)).unwrap();
    assert_eq!(sorted(result), vec![pt(&[-10]), pt(&[15])]);
}

#[test]
fn empty_tree_behavior() {
    let tree = KdTree::new(2).unwrap();
    assert_eq!(KdTree::default().dims(), tree.dims());
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), -1);
    assert!(tree.root().is_none());
    assert!(matches!(
        tree.root_point(),
        Err(PointIndexError::EmptyTree)
    ));
    assert!(!tree.search(&pt(&[0, 0])).unwrap());
    assert!(tree.range(&pt(&[0, 0]), Decimal::from(10)).unwrap().is_empty());
    assert!(tree.nearest_neighbor(&pt(&[0, 0])).unwrap().is_none());
    assert!(tree.k_nearest_neighbors(3, &pt(&[0, 0])).unwrap().is_empty());

    let mut tree = tree;
    tree.delete(&pt(&[1, 1])).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(matches!(
        KdTree::new(0),
        Err(PointIndexError::InvalidConfig(_))
    ));
    assert!(matches!(
        Point::new(Vec::new()),
        Err(PointIndexError::InvalidConfig(_))
    ));

    let tree = KdTree::new(2).unwrap();
    assert!(matches!(
        tree.k_nearest_neighbors(0, &pt(&[0, 0])),
        Err(PointIndexError::InvalidConfig(_))
    ));
}

#[test]
fn dimension_mismatches_are_rejected() {
    let mut tree = KdTree::new(2).unwrap();
    tree.insert(pt(&[1, 2])).unwrap();

    assert!(matches!(
        tree.insert(pt(&[1, 2, 3])),
        Err(PointIndexError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
    assert!(matches!(
        tree.search(&pt(&[1])),
        Err(PointIndexError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        tree.range(&pt(&[1, 2, 3]), Decimal::ONE),
        Err(PointIndexError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        tree.nearest_neighbor(&pt(&[1])),
        Err(PointIndexError::DimensionMismatch { .. })
    ));

    // Nothing was mutated by the rejected operations.
    assert_eq!(tree.len(), 1);
    assert!(matches!(
        pt(&[1, 2]).distance_squared(&pt(&[1, 2, 3])),
        Err(PointIndexError::DimensionMismatch { .. })
    ));
}

#[test]
fn delete_borrows_replacement_from_left_subtree() {
    let mut tree = KdTree::new(2).unwrap();
    for coords in [[10, 10], [5, 5], [3, 8], [7, 2]] {
        tree.insert(pt(&coords)).unwrap();
    }

    // The root has no right child, so its replacement comes from the left
    // subtree, which is then re-parented as the right subtree.
    tree.delete(&pt(&[10, 10])).unwrap();

    assert_eq!(tree.root_point().unwrap(), pt(&[3, 8]));
    let root = tree.root().unwrap();
    assert!(root.left().is_none());
    let right = root.right().unwrap();
    assert_eq!(*right.point(), pt(&[5, 5]));
    assert_eq!(*right.left().unwrap().point(), pt(&[7, 2]));
    assert!(right.right().is_none());

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.height(), 2);
    assert_invariants(&tree);
    for coords in [[5, 5], [3, 8], [7, 2]] {
        assert!(tree.search(&pt(&coords)).unwrap());
    }
    assert!(!tree.search(&pt(&[10, 10])).unwrap());
}

#[test]
fn duplicate_points_can_coexist() {
    let mut tree = KdTree::new(2).unwrap();
    tree.insert(pt(&[1, 1])).unwrap();
    tree.insert(pt(&[1, 1])).unwrap();
    assert_eq!(tree.len(), 2);
    assert_invariants(&tree);

    tree.delete(&pt(&[1, 1])).unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree.search(&pt(&[1, 1])).unwrap());

    tree.delete(&pt(&[1, 1])).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn random_round_trip_preserves_invariants() {
    let mut rng = StdRng::seed_from_u64(420);
    let points = distinct_points(&mut rng, 48, 3, 40);

    let mut tree = KdTree::new(3).unwrap();
    for point in &points {
        tree.insert(point.clone()).unwrap();
    }
    assert_eq!(tree.len(), points.len());
    assert_invariants(&tree);
    for point in &points {
        assert!(tree.search(point).unwrap());
    }

    let mut order = points.clone();
    order.shuffle(&mut rng);
    for (deleted, point) in order.iter().enumerate() {
        tree.delete(point).unwrap();
        assert_eq!(tree.len(), points.len() - deleted - 1);
        assert!(!tree.search(point).unwrap());
        assert_invariants(&tree);
    }

    assert!(tree.is_empty());
    assert_eq!(tree.height(), -1);
    for point in &points {
        assert!(!tree.search(point).unwrap());
    }
}

#[test]
fn deleting_absent_points_is_a_no_op() {
    let mut rng = StdRng::seed_from_u64(7);
    let points = distinct_points(&mut rng, 20, 2, 15);

    let mut tree = KdTree::new(2).unwrap();
    for point in &points {
        tree.insert(point.clone()).unwrap();
    }

    tree.delete(&pt(&[999, 999])).unwrap();
    assert_eq!(tree.len(), points.len());
    assert_invariants(&tree);
    for point in &points {
        assert!(tree.search(point).unwrap());
    }
}

#[test]
fn range_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(99);
    let points = distinct_points(&mut rng, 64, 2, 60);

    let mut tree = KdTree::new(2).unwrap();
    for point in &points {
        tree.insert(point.clone()).unwrap();
    }

    for (anchor, radius) in [
        (pt(&[0, 0]), Decimal::from(25)),
        (pt(&[-30, 40]), Decimal::from(50)),
        (points[0].clone(), Decimal::from(35)),
        (pt(&[5, -5]), Decimal::ZERO),
    ] {
        let radius_sq = radius * radius;
        let expected: Vec<Point> = points
            .iter()
            .filter(|p| **p != anchor && sq_dist(p, &anchor) <= radius_sq)
            .cloned()
            .collect();
        let result = tree.range(&anchor, radius).unwrap();
        assert_eq!(sorted(result), sorted(expected));
    }
}

#[test]
fn nearest_neighbor_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(1234);
    let anchor = pt(&[3, -7]);
    let points = points_with_unique_distances(&mut rng, 50, 2, 80, &anchor);

    let mut tree = KdTree::new(2).unwrap();
    for point in &points {
        tree.insert(point.clone()).unwrap();
    }

    let mut expected = points.clone();
    expected.sort_by_key(|p| sq_dist(p, &anchor));
    assert_eq!(
        tree.nearest_neighbor(&anchor).unwrap(),
        Some(expected[0].clone())
    );

    // A stored anchor is never its own neighbor.
    let mut tree = tree;
    tree.insert(anchor.clone()).unwrap();
    assert_eq!(
        tree.nearest_neighbor(&anchor).unwrap(),
        Some(expected[0].clone())
    );
}

#[test]
fn k_nearest_neighbors_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(5678);
    let anchor = pt(&[-2, 9]);
    let points = points_with_unique_distances(&mut rng, 60, 2, 90, &anchor);

    let mut tree = KdTree::new(2).unwrap();
    for point in &points {
        tree.insert(point.clone()).unwrap();
    }

    let mut expected = points.clone();
    expected.sort_by_key(|p| sq_dist(p, &anchor));

    for k in [1, 5, 17] {
        assert_eq!(tree.k_nearest_neighbors(k, &anchor).unwrap(), expected[..k]);
    }

    // Asking for more neighbors than stored returns everything, still in
    // ascending distance order.
    assert_eq!(
        tree.k_nearest_neighbors(points.len() + 10, &anchor).unwrap(),
        expected
    );
}
