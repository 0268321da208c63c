//! Benchmarks for feature assembly
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses synthetic tables sized like a real TMDB-derived artifact set.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{SuccessRateTable, SuccessRateTables};
use pipeline::{FeatureAssembler, MovieRequest};
use serde_json::json;
use std::sync::Arc;

fn build_tables(size: usize) -> Arc<SuccessRateTables> {
    let table = || {
        SuccessRateTable::from_entries(
            (0..size).map(|i| (format!("Person {}", i), (i % 100) as f64 / 100.0)),
        )
    };
    Arc::new(SuccessRateTables::new(table(), table(), table(), table()))
}

fn sample_request() -> MovieRequest {
    match json!({
        "movie_title": "Benchmark",
        "director": "Person 42",
        "actor1": "person 7",
        "actor2": "Nobody Known",
        "actor3": "",
        "budget": 150000000,
        "runtime": 138,
        "genres": "Action",
        "production_companies": "Warner Bros.",
        "original_language": "en",
        "release_year": 2024,
        "release_month": 6,
        "avg_rating": 8.2,
        "ratings_count": 50000
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn bench_assemble_single(c: &mut Criterion) {
    let assembler = FeatureAssembler::new(build_tables(5000));
    let request = sample_request();

    c.bench_function("assemble_single", |b| {
        b.iter(|| {
            let record = assembler.assemble(black_box(&request));
            black_box(record)
        })
    });
}

fn bench_assemble_batch(c: &mut Criterion) {
    let assembler = FeatureAssembler::new(build_tables(5000));
    let requests: Vec<MovieRequest> = (0..500).map(|_| sample_request()).collect();

    c.bench_function("assemble_batch_500", |b| {
        b.iter(|| {
            let records = assembler.assemble_batch(black_box(&requests));
            black_box(records)
        })
    });
}

criterion_group!(benches, bench_assemble_single, bench_assemble_batch);
criterion_main!(benches);
