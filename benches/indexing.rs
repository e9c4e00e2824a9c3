//! Build and lookup benchmarks over a synthetic catalog.
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use apidex::index::{IndexBuilder, IndexReader, IndexWriter};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Deterministic catalog shaped like real API display names.
fn synthetic_catalog(size: usize) -> Vec<(String, u32)> {
    const NAMESPACES: &[&str] = &["System", "System.Collections", "System.IO", "Microsoft.Win32"];
    const TYPES: &[&str] = &["List`1", "Dictionary`2", "String", "StreamReader", "RegistryKey"];
    const MEMBERS: &[&str] = &["Add(T)", "Clear()", "Count", "ToString()", "GetHashCode()"];

    (0..size)
        .map(|i| {
            let ns = NAMESPACES[i % NAMESPACES.len()];
            let ty = TYPES[(i / NAMESPACES.len()) % TYPES.len()];
            let member = MEMBERS[i % MEMBERS.len()];
            (format!("{ns}.Gen{i}.{ty}.{member}"), i as u32)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let catalog = synthetic_catalog(2_000);

    c.bench_function("build_2k", |b| {
        b.iter(|| {
            let mut builder = IndexBuilder::new();
            for (name, id) in &catalog {
                builder.add(name, *id);
            }
            black_box(builder.node_count())
        })
    });
}

fn bench_serialize(c: &mut Criterion) {
    let catalog = synthetic_catalog(2_000);
    let mut builder = IndexBuilder::new();
    for (name, id) in &catalog {
        builder.add(name, *id);
    }

    c.bench_function("serialize_2k", |b| {
        b.iter(|| black_box(IndexWriter::to_bytes(&builder)))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let catalog = synthetic_catalog(10_000);
    let mut builder = IndexBuilder::new();
    for (name, id) in &catalog {
        builder.add(name, *id);
    }
    let reader = IndexReader::from_bytes(IndexWriter::to_bytes(&builder)).unwrap();

    let mut group = c.benchmark_group("lookup_10k");
    for query in ["list", "dictionary`2.add", "gen42", "zzz", "s"] {
        group.bench_function(query, |b| b.iter(|| black_box(reader.lookup(query))));
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_serialize, bench_lookup);
criterion_main!(benches);
