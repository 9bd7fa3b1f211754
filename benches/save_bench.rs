//! Benchmarks for jotdb storage operations

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use jotdb::{Config, Database, Document};

fn doc(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Config with background flushing effectively disabled, so benchmarks
/// measure only the operation under test.
fn quiet_config() -> Config {
    Config::builder()
        .save_interval(Duration::from_secs(3600))
        .build()
}

fn put_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_with(dir.path().join("bench.jsonl"), quiet_config()).unwrap();

    let mut i = 0u64;
    c.bench_function("put_small_doc", |b| {
        b.iter(|| {
            let key = format!("k{i}");
            i += 1;
            db.put(
                black_box(&key),
                doc(json!({"title": "benchmark", "seq": i})),
            )
            .unwrap();
        })
    });
}

fn get_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_with(dir.path().join("bench.jsonl"), quiet_config()).unwrap();
    for i in 0..1_000 {
        db.put(&format!("k{i}"), doc(json!({"seq": i}))).unwrap();
    }

    c.bench_function("get_hit", |b| {
        b.iter(|| black_box(db.get(black_box("k500"))))
    });
}

fn save_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_with(dir.path().join("bench.jsonl"), quiet_config()).unwrap();
    for i in 0..1_000 {
        db.put(&format!("k{i}"), doc(json!({"seq": i, "payload": "x".repeat(64)})))
            .unwrap();
    }

    c.bench_function("explicit_save_1k_docs", |b| b.iter(|| db.save().unwrap()));
}

criterion_group!(benches, put_benchmark, get_benchmark, save_benchmark);
criterion_main!(benches);
