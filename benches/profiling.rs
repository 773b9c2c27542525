//! Benchmarks for whole-report profiling of in-memory datasets.

use chrono::DateTime;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use rust_data_profiling::profile::{MetricProfiler, NumericProfiler, TextProfiler};
use rust_data_profiling::report::{ExecutionMode, ProfileAggregator, ProfileOptions};
use rust_data_profiling::types::{DataSet, DataType, Field, Schema, Value};

/// Deterministic mixed-type dataset: two numeric, one text and one temporal column.
fn generate(rows: usize) -> DataSet {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("amount", DataType::Float64),
        Field::new("label", DataType::Utf8),
        Field::new("created", DataType::Timestamp),
    ]);
    let rows = (0..rows)
        .map(|i| {
            let amount = if i % 17 == 0 {
                Value::Null
            } else {
                Value::Float64((i as f64 * 0.37).sin() * 1_000.0)
            };
            let created = DateTime::from_timestamp(1_700_000_000 + (i as i64 % 5_000) * 60, 0)
                .map_or(Value::Null, |d| Value::Timestamp(d.naive_utc()));
            vec![
                Value::Int64(i as i64),
                amount,
                Value::Utf8(format!("label-{}", i % 97)),
                created,
            ]
        })
        .collect();
    DataSet::new(schema, rows)
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    group.measurement_time(Duration::from_secs(8));

    let sequential = ProfileAggregator::new(ProfileOptions::default()).unwrap();
    let parallel = ProfileAggregator::new(ProfileOptions {
        execution: ExecutionMode::Parallel { num_threads: None },
        ..ProfileOptions::default()
    })
    .unwrap();

    for rows in [1_000, 10_000, 50_000] {
        let ds = generate(rows);
        group.bench_with_input(BenchmarkId::new("sequential", rows), &ds, |b, ds| {
            b.iter(|| sequential.run(black_box(ds)))
        });
        group.bench_with_input(BenchmarkId::new("parallel", rows), &ds, |b, ds| {
            b.iter(|| parallel.run(black_box(ds)))
        });
    }

    group.finish();
}

fn bench_single_family(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_family");
    let ds = generate(10_000);

    group.bench_function("numeric", |b| {
        let profiler = NumericProfiler::default();
        b.iter(|| profiler.evaluate(black_box(&ds)))
    });
    group.bench_function("text", |b| {
        let profiler = TextProfiler::default();
        b.iter(|| profiler.evaluate(black_box(&ds)))
    });

    group.finish();
}

criterion_group!(benches, bench_report, bench_single_family);
criterion_main!(benches);
