use criterion::{black_box, criterion_group, criterion_main, Criterion};
use point_index::{Decimal, KdTree, Point, PrQuadTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(n: usize, span: i64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(48);
    (0..n)
        .map(|_| Point::xy(rng.gen_range(-span..=span), rng.gen_range(-span..=span)))
        .collect()
}

fn bench_queries(c: &mut Criterion) {
    let points = random_points(10_000, 500_000);

    let mut kd = KdTree::new(2).unwrap();
    for point in &points {
        kd.insert(point.clone()).unwrap();
    }

    // Side 2^20 spans [-524288, 524288), covering every generated point.
    let mut quad = PrQuadTree::new(20, 8).unwrap();
    for point in &points {
        quad.insert(point.clone()).unwrap();
    }

    let anchor = Point::xy(1_234, -56_789);
    let radius = Decimal::from(50_000);

    c.bench_function("kdtree knn k=10", |b| {
        b.iter(|| kd.k_nearest_neighbors(10, black_box(&anchor)).unwrap())
    });
    c.bench_function("quadtree knn k=10", |b| {
        b.iter(|| quad.k_nearest_neighbors(10, black_box(&anchor)).unwrap())
    });
    c.bench_function("kdtree range", |b| {
        b.iter(|| kd.range(black_box(&anchor), radius).unwrap())
    });
    c.bench_function("quadtree range", |b| {
        b.iter(|| quad.range(black_box(&anchor), radius).unwrap())
    });
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
