//! Benchmarks for test selection and the underlying statistics
//!
//! Run with: cargo bench --bench selector_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use asthmastat::pipeline::{
    run_statistical_tests, DatasetSchema, FeatureKind, FeatureSpec, SelectorConfig,
};
use asthmastat::stats::{mann_whitney_u, shapiro_wilk};

/// Synthetic frame with alternating continuous and binary features
fn generate_test_dataframe(n_rows: usize, n_features: usize, seed: u64) -> (DataFrame, DatasetSchema) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let diagnosis: Vec<i64> = (0..n_rows).map(|_| i64::from(rng.gen_bool(0.2))).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(n_features + 1);
    let mut features = Vec::with_capacity(n_features);

    for i in 0..n_features {
        let name = format!("feature_{}", i);
        if i % 2 == 0 {
            let values: Vec<f64> = diagnosis
                .iter()
                .map(|&d| rng.gen::<f64>() * 10.0 + d as f64)
                .collect();
            columns.push(Column::new(name.as_str().into(), values));
            features.push(FeatureSpec {
                name,
                kind: FeatureKind::Continuous,
            });
        } else {
            let values: Vec<i64> = (0..n_rows).map(|_| i64::from(rng.gen_bool(0.4))).collect();
            columns.push(Column::new(name.as_str().into(), values));
            features.push(FeatureSpec {
                name,
                kind: FeatureKind::Binary,
            });
        }
    }
    columns.push(Column::new("Diagnosis".into(), diagnosis));

    let schema = DatasetSchema {
        target: "Diagnosis".to_string(),
        excluded: vec![],
        features,
    };
    (DataFrame::new(columns).unwrap(), schema)
}

fn bench_run_statistical_tests(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_statistical_tests");

    for n_rows in [2_392usize, 20_000] {
        let (df, schema) = generate_test_dataframe(n_rows, 26, 42);
        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &df, |b, df| {
            b.iter(|| run_statistical_tests(black_box(df), &schema, &SelectorConfig::default()))
        });
    }
    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let x: Vec<f64> = (0..2_000).map(|_| rng.gen::<f64>()).collect();
    let y: Vec<f64> = (0..500).map(|_| rng.gen::<f64>() + 0.1).collect();

    c.bench_function("shapiro_wilk_2000", |b| b.iter(|| shapiro_wilk(black_box(&x))));
    c.bench_function("mann_whitney_u_2000x500", |b| {
        b.iter(|| mann_whitney_u(black_box(&x), black_box(&y)))
    });
}

criterion_group!(benches, bench_run_statistical_tests, bench_statistics);
criterion_main!(benches);
