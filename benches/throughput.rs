//! Throughput Benchmark for simple-kv
//!
//! This benchmark measures the store and the request path
//! under various workloads.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use simple_kv::commands::CommandHandler;
use simple_kv::protocol::parse_command;
use simple_kv::storage::Store;
use std::sync::Arc;
use std::time::Duration;

/// Benchmark PUT operations
fn bench_put(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    let mut group = c.benchmark_group("put");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.put(format!("key:{}", i), "small_value");
            i += 1;
        });
    });

    group.bench_function("put_medium", |b| {
        let mut i = 0u64;
        let value = "x".repeat(1024); // 1KB value
        b.iter(|| {
            store.put(format!("key:{}", i), value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    // Pre-populate with data
    for i in 0..100_000 {
        store.put(format!("key:{}", i), format!("value:{}", i));
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark request line parsing and dispatch
fn bench_request(c: &mut Criterion) {
    let handler = CommandHandler::new(Arc::new(Store::new()));
    handler.execute(b"PUT hello world");

    let mut group = c.benchmark_group("request");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_put", |b| {
        b.iter(|| black_box(parse_command(black_box(b"PUT 00000000000000FF some_value"))));
    });

    group.bench_function("parse_malformed", |b| {
        b.iter(|| black_box(parse_command(black_box(b"PUT key two words"))));
    });

    group.bench_function("execute_get", |b| {
        b.iter(|| black_box(handler.execute(black_box(b"GET hello"))));
    });

    group.finish();
}

/// Benchmark contended access: every operation takes the same lock
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = Arc::new(Store::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = format!("key:{}:{}", t, i);
                            store.put(key.clone(), "value");
                            store.get(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_request, bench_concurrent);
criterion_main!(benches);
