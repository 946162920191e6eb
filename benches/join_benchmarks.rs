use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quadjoin::compute::bbox::polygon_bbox;
use quadjoin::compute::join::join;
use quadjoin::compute::pip::brute_force_contains;
use quadjoin::compute::quadtree::QuadTree;
use quadjoin::{
    BoundingBox2D, JoinConfig, PointBatch, PointIndex, RingPolygon, TaggedPoint, contains,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

fn random_points(n: usize, seed: u64) -> Vec<TaggedPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n as u64)
        .map(|i| TaggedPoint::new(i, rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
        .collect()
}

/// Star-shaped polygons scattered over the same domain as the points.
fn random_polygons(n: usize, seed: u64) -> Vec<RingPolygon> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n as u64)
        .map(|id| {
            let cx = rng.gen_range(50.0..950.0);
            let cy = rng.gen_range(50.0..950.0);
            let sides = rng.gen_range(5..16);
            let ring: Vec<(f64, f64)> = (0..sides)
                .map(|k| {
                    let a = TAU * k as f64 / sides as f64;
                    let r = rng.gen_range(10.0..50.0);
                    (cx + r * a.cos(), cy + r * a.sin())
                })
                .collect();
            RingPolygon::from_exterior(id, ring)
        })
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_build");
    group.sample_size(20);

    for &n in &[10_000usize, 100_000, 1_000_000] {
        let points = random_points(n, 1);
        let config = JoinConfig::default();
        group.bench_with_input(BenchmarkId::new("parallel", n), &points, |b, points| {
            b.iter(|| QuadTree::from_points(black_box(points.clone()), &config).unwrap())
        });

        let sequential = JoinConfig::default().with_parallel_threshold(usize::MAX);
        group.bench_with_input(BenchmarkId::new("sequential", n), &points, |b, points| {
            b.iter(|| QuadTree::from_points(black_box(points.clone()), &sequential).unwrap())
        });
    }

    group.finish();
}

fn benchmark_leaf_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaf_capacity");
    group.sample_size(20);

    let points = random_points(200_000, 2);
    let polygons = random_polygons(200, 3);
    for &capacity in &[4usize, 15, 64, 256, 1024] {
        let config = JoinConfig::default().with_leaf_capacity(capacity);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &config, |b, config| {
            b.iter(|| contains(black_box(&points), black_box(&polygons), config).unwrap())
        });
    }

    group.finish();
}

fn benchmark_join_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_phase");

    let points = random_points(100_000, 4);
    let tree = QuadTree::from_points(points, &JoinConfig::default()).unwrap();
    for &n in &[10usize, 100, 1000] {
        let boxes: Vec<(usize, BoundingBox2D)> = random_polygons(n, 5)
            .iter()
            .enumerate()
            .map(|(i, p)| (i, polygon_bbox(p).unwrap()))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &boxes, |b, boxes| {
            b.iter(|| join(&tree, black_box(boxes)))
        });
    }

    group.finish();
}

fn benchmark_indexed_vs_brute_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexed_vs_brute_force");
    group.sample_size(10);

    let points = random_points(50_000, 6);
    let polygons = random_polygons(50, 7);
    let config = JoinConfig::default();

    group.bench_function("indexed", |b| {
        b.iter(|| contains(black_box(&points), black_box(&polygons), &config).unwrap())
    });
    group.bench_function("brute_force", |b| {
        b.iter(|| brute_force_contains(black_box(&points), black_box(&polygons)))
    });

    group.finish();
}

fn benchmark_index_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_updates");
    group.sample_size(10);

    let index = PointIndex::new(random_points(100_000, 8), JoinConfig::default()).unwrap();
    let polygons = random_polygons(100, 9);

    group.bench_function("query_snapshot", |b| {
        b.iter(|| index.contains(black_box(&polygons)).unwrap())
    });

    group.bench_function("apply_batch_1000", |b| {
        let mut next_id = 1_000_000u64;
        b.iter(|| {
            let mut batch = PointBatch::new();
            for (i, p) in random_points(1000, next_id).into_iter().enumerate() {
                batch = batch
                    .insert(TaggedPoint::new(next_id + i as u64, p.x(), p.y()))
                    .delete(next_id - 1_000_000 + i as u64);
            }
            next_id += 1000;
            index.apply(batch).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_build,
    benchmark_leaf_capacity,
    benchmark_join_phase,
    benchmark_indexed_vs_brute_force,
    benchmark_index_updates
);
criterion_main!(benches);
