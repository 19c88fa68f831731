//! Criterion benchmarks for the correlation clustering colony.
//!
//! Compares full against incremental candidate scoring, and global against
//! local candidate construction, on seeded random instances.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_corrclust::aco::{AcoConfig, Colony, Construction, Scoring};
use u_corrclust::partition::Partition;
use u_corrclust::relation::{RelationDensity, RelationMatrix};

fn instance(size: usize) -> RelationMatrix {
    let mut rng = StdRng::seed_from_u64(42);
    RelationMatrix::from_generator(size, &RelationDensity::new(0.7, 0.2), &mut rng)
        .expect("valid density")
}

// ===========================================================================
// Single-move scoring
// ===========================================================================

fn bench_objective_if(c: &mut Criterion) {
    let mut group = c.benchmark_group("objective_if");

    for &n in &[50, 200, 500] {
        let matrix = instance(n);
        let mut rng = StdRng::seed_from_u64(7);
        let mut partition = Partition::random(n, &mut rng);
        partition.compute_objective(&matrix);

        group.bench_with_input(BenchmarkId::new("naive", n), &n, |b, &n| {
            b.iter(|| partition.objective_if_naive(black_box(n / 2), black_box(0), &matrix))
        });
        group.bench_with_input(BenchmarkId::new("incremental", n), &n, |b, &n| {
            b.iter(|| partition.objective_if(black_box(n / 2), black_box(0), &matrix))
        });
    }
    group.finish();
}

// ===========================================================================
// Full colony runs
// ===========================================================================

fn bench_colony_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony_scoring");
    group.sample_size(10);

    for &n in &[20, 50] {
        let matrix = instance(n);
        for scoring in [Scoring::Naive, Scoring::Incremental] {
            let config = AcoConfig::default()
                .with_max_iterations(5)
                .with_scoring(scoring)
                .with_seed(42);
            group.bench_with_input(
                BenchmarkId::new(format!("{scoring:?}"), n),
                &(matrix.clone(), config),
                |b, (m, c)| {
                    b.iter(|| {
                        let mut colony =
                            Colony::new(m.clone(), c.clone()).expect("valid colony");
                        black_box(colony.run())
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_colony_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony_construction");
    group.sample_size(10);

    for &n in &[50, 200] {
        let matrix = instance(n);
        for construction in [Construction::Global, Construction::Local] {
            let config = AcoConfig::default()
                .with_max_iterations(5)
                .with_construction(construction)
                .with_seed(42);
            group.bench_with_input(
                BenchmarkId::new(format!("{construction:?}"), n),
                &(matrix.clone(), config),
                |b, (m, c)| {
                    b.iter(|| {
                        let mut colony =
                            Colony::new(m.clone(), c.clone()).expect("valid colony");
                        black_box(colony.run())
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_objective_if,
    bench_colony_scoring,
    bench_colony_construction
);
criterion_main!(benches);
