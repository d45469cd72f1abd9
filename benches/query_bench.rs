//! Criterion benchmarks for lambda compilation and the query operators.
//!
//! Separates the one-off cost of compiling a lambda string from the
//! per-element cost of evaluating it, so operator timings can be read with
//! and without compilation included.
//!
//! Run:
//!   cargo bench
//!   cargo bench -- compile            # one group
//!   cargo bench -- operators          # one group

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use indexmap::IndexMap;
use linq_core::{compile, LambdaCache, Sequence, Value};

// ── Data builders ─────────────────────────────────────────────────────────────

/// `n` product objects: {id, name, category, price, inStock}.
fn products(n: usize) -> Sequence {
    let categories = ["Electronics", "Clothing", "Books", "Home"];
    (0..n)
        .map(|i| {
            let mut m = IndexMap::new();
            m.insert("id".to_string(), Value::from(i));
            m.insert("name".to_string(), Value::string(format!("Product {i}")));
            m.insert(
                "category".to_string(),
                Value::string(categories[i % categories.len()]),
            );
            m.insert("price".to_string(), Value::from(10.0 + (i * 37 % 200) as f64));
            m.insert("inStock".to_string(), Value::Bool(i % 3 != 0));
            Value::object(m)
        })
        .collect()
}

// ── Bench groups ──────────────────────────────────────────────────────────────

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.sample_size(300);

    for (name, source) in [
        ("member", "x => x.value"),
        ("predicate", "x => x.price > 100 && x.inStock"),
        ("ternary", "p => p.price > 100 ? p.name + ' (premium)' : p.name"),
    ] {
        group.bench_function(name, |b| b.iter(|| black_box(compile(black_box(source)).unwrap())));
    }

    let mut cache = LambdaCache::new();
    group.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cache.get_or_compile(black_box("x => x.value")).unwrap()))
    });

    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");

    for n in [100_usize, 1000, 10000] {
        let data = products(n);

        group.bench_with_input(BenchmarkId::new("where", n), &data, |b, d| {
            b.iter(|| black_box(d.where_("x => x.price > 100 && x.inStock").unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("select", n), &data, |b, d| {
            b.iter(|| black_box(d.select("x => x.price * 2").unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("sum", n), &data, |b, d| {
            b.iter(|| black_box(d.sum("x => x.price").unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("group", n), &data, |b, d| {
            b.iter(|| black_box(d.group("x => x.category").unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("order_by", n), &data, |b, d| {
            b.iter(|| black_box(d.order_by("x => x.price").unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("distinct_by", n), &data, |b, d| {
            b.iter(|| black_box(d.distinct_by("x => x.price").unwrap()))
        });
    }

    group.finish();
}

fn bench_precompiled(c: &mut Criterion) {
    let mut group = c.benchmark_group("precompiled");
    let data = products(1000);

    // Same predicate, compiled per call vs. compiled once
    group.bench_function("where_from_str_1000", |b| {
        b.iter(|| black_box(data.where_("x => x.price > 100").unwrap()))
    });
    let lambda = compile("x => x.price > 100").unwrap();
    group.bench_function("where_precompiled_1000", |b| {
        b.iter(|| black_box(data.where_(&lambda).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_operators, bench_precompiled);
criterion_main!(benches);
