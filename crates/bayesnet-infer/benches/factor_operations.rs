//! Benchmarks for factor operations
//!
//! This benchmark suite measures the performance of core factor operations including:
//! - Factor product (joining scopes)
//! - Marginalization (summing out variables)
//! - Restriction (conditioning on evidence)
//! - Normalization

use bayesnet_infer::{Factor, OperationCost, VarId};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

/// Create a factor over `vars` with the same cardinality for every variable
fn create_factor_with_card(name: &str, vars: &[usize], card: usize) -> Factor {
    let size = card.pow(vars.len() as u32);
    let values: Vec<f64> = (0..size).map(|i| (i as f64 + 1.0) / size as f64).collect();
    Factor::new(
        name,
        vars.iter().map(|&v| VarId(v)).collect(),
        vec![card; vars.len()],
        values,
    )
    .unwrap()
}

/// Benchmark factor product operations
fn bench_factor_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_product");

    // Disjoint scopes
    let f1 = create_factor_with_card("f1", &[0], 2);
    let f2 = create_factor_with_card("f2", &[1], 2);
    group.bench_function("independent_binary", |b| {
        b.iter(|| {
            let mut cost = OperationCost::default();
            black_box(f1.multiply(&f2, &mut cost).unwrap());
        });
    });

    // Shared variable
    let f3 = create_factor_with_card("f3", &[0, 1], 2);
    let f4 = create_factor_with_card("f4", &[1, 2], 2);
    group.bench_function("overlapping_binary", |b| {
        b.iter(|| {
            let mut cost = OperationCost::default();
            black_box(f3.multiply(&f4, &mut cost).unwrap());
        });
    });

    for card in [5, 10, 20] {
        let large_f1 = create_factor_with_card("large1", &[0, 1], card);
        let large_f2 = create_factor_with_card("large2", &[1, 2], card);

        group.throughput(Throughput::Elements((card * card * card) as u64));
        group.bench_with_input(
            BenchmarkId::new("large_card", card),
            &(large_f1, large_f2),
            |b, (f1, f2)| {
                b.iter(|| {
                    let mut cost = OperationCost::default();
                    black_box(f1.multiply(f2, &mut cost).unwrap());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark marginalization operations
fn bench_sum_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_out");

    let f = create_factor_with_card("f", &[0, 1, 2], 3);
    group.bench_function("ternary_3x3x3_first", |b| {
        b.iter(|| {
            let mut cost = OperationCost::default();
            black_box(f.sum_out(VarId(0), &mut cost));
        });
    });
    group.bench_function("ternary_3x3x3_last", |b| {
        b.iter(|| {
            let mut cost = OperationCost::default();
            black_box(f.sum_out(VarId(2), &mut cost));
        });
    });

    for num_vars in [4, 6, 8] {
        let vars: Vec<usize> = (0..num_vars).collect();
        let f = create_factor_with_card("wide", &vars, 2);
        group.throughput(Throughput::Elements(f.size() as u64));
        group.bench_with_input(BenchmarkId::new("binary_vars", num_vars), &f, |b, f| {
            b.iter(|| {
                let mut cost = OperationCost::default();
                black_box(f.sum_out(VarId(num_vars / 2), &mut cost));
            });
        });
    }

    group.finish();
}

/// Benchmark evidence restriction and normalization
fn bench_restrict_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("restrict_normalize");

    for card in [2, 5, 10] {
        let f = create_factor_with_card("f", &[0, 1, 2], card);
        group.bench_with_input(BenchmarkId::new("restrict", card), &f, |b, f| {
            b.iter(|| {
                black_box(f.restrict(VarId(1), card - 1).unwrap());
            });
        });
        group.bench_with_input(BenchmarkId::new("normalize", card), &f, |b, f| {
            b.iter(|| {
                black_box(f.normalize().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_factor_product,
    bench_sum_out,
    bench_restrict_normalize,
);
criterion_main!(benches);
