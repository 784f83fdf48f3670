//! Performance benchmarks for dataset deserialization
//!
//! This benchmark suite measures:
//! - The sizing pass (metadata resolution plus row counting)
//! - The full pipeline (sizing, binding, writing) for positional rows
//! - The same for keyed rows
//! - Sparse update batches with variable row counts
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench -p pgm-io
//!
//! # Run specific benchmark
//! cargo bench -p pgm-io -- parse_positional
//! ```
//!
//! Documents are generated in memory, so no test data files are required.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pgm_core::meta_data;
use pgm_io::{Deserializer, OwnedBuffers};
use serde_json::{json, Value};

const GRID_SIZES: &[usize] = &[100, 1_000, 10_000];
const BATCH_SIZES: &[usize] = &[10, 100, 1_000];

/// Input dataset with `n` nodes, `n - 1` lines and `n` loads.
fn input_document(n: usize, keyed: bool) -> Value {
    let nodes: Vec<Value> = (0..n)
        .map(|i| {
            if keyed {
                json!({"id": i, "u_rated": 10.5e3})
            } else {
                json!([i, 10.5e3])
            }
        })
        .collect();
    let lines: Vec<Value> = (1..n)
        .map(|i| {
            json!({
                "id": n + i, "from_node": i - 1, "to_node": i,
                "from_status": 1, "to_status": 1,
                "r1": 0.25, "x1": 0.2, "c1": 10e-6, "tan1": 0.0
            })
        })
        .collect();
    let loads: Vec<Value> = (0..n)
        .map(|i| {
            if keyed {
                json!({"id": 2 * n + i, "node": i, "status": 1, "type": 0,
                       "p_specified": 1e5, "q_specified": 2e4})
            } else {
                json!([2 * n + i, i, 1, 0, 1e5, 2e4])
            }
        })
        .collect();
    json!({
        "version": "1.0",
        "type": "input",
        "is_batch": false,
        "attributes": {
            "node": ["id", "u_rated"],
            "sym_load": ["id", "node", "status", "type", "p_specified", "q_specified"]
        },
        "data": {"node": nodes, "line": lines, "sym_load": loads}
    })
}

/// Update batch where scenario `s` changes `s % 4` loads.
fn sparse_batch_document(batch_size: usize) -> Value {
    let scenarios: Vec<Value> = (0..batch_size)
        .map(|s| {
            let loads: Vec<Value> = (0..s % 4)
                .map(|i| json!([i, 1e5 * (s as f64), null]))
                .collect();
            json!({"sym_load": loads})
        })
        .collect();
    json!({
        "version": "1.0",
        "type": "update",
        "is_batch": true,
        "attributes": {"sym_load": ["id", "p_specified", "q_specified"]},
        "data": scenarios
    })
}

fn deserialize_all(document: &Value) {
    let mut deserializer = Deserializer::new(document.clone(), meta_data()).unwrap();
    let mut buffers = OwnedBuffers::allocate(&deserializer, None);
    buffers.bind(&mut deserializer).unwrap();
    deserializer.parse().unwrap();
    drop(deserializer);
    black_box(buffers);
}

/// Benchmark: metadata resolution and sizing only
fn bench_sizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sizing");

    for &n in GRID_SIZES {
        let document = input_document(n, false);
        group.bench_with_input(BenchmarkId::new("input", n), &document, |b, document| {
            b.iter(|| {
                let deserializer = Deserializer::new(document.clone(), meta_data()).unwrap();
                black_box(deserializer.n_components())
            })
        });
    }

    group.finish();
}

/// Benchmark: full deserialization of positional rows
fn bench_parse_positional(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_positional");

    for &n in GRID_SIZES {
        let document = input_document(n, false);
        group.bench_with_input(BenchmarkId::new("input", n), &document, |b, document| {
            b.iter(|| deserialize_all(document))
        });
    }

    group.finish();
}

/// Benchmark: full deserialization of keyed rows
fn bench_parse_keyed(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_keyed");

    for &n in GRID_SIZES {
        let document = input_document(n, true);
        group.bench_with_input(BenchmarkId::new("input", n), &document, |b, document| {
            b.iter(|| deserialize_all(document))
        });
    }

    group.finish();
}

/// Benchmark: sparse update batches with offset indices
fn bench_sparse_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_batch");

    for &batch_size in BATCH_SIZES {
        let document = sparse_batch_document(batch_size);
        group.bench_with_input(
            BenchmarkId::new("update", batch_size),
            &document,
            |b, document| b.iter(|| deserialize_all(document)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sizing,
    bench_parse_positional,
    bench_parse_keyed,
    bench_sparse_batch
);
criterion_main!(benches);
