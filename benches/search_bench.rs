//! Benchmarks for vector search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sorted_vectordb::{CosineSimilarity, Entry, QueryOptions, VectorDb};

fn create_random_entries(n: usize, dim: usize) -> Vec<Entry<()>> {
    (0..n)
        .map(|i| {
            let data: Vec<f32> = (0..dim).map(|_| rand::random::<f32>()).collect();
            Entry::bare(format!("v{:06}", i), data)
        })
        .collect()
}

fn benchmark_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let query = vec![0.5f32; 128];
    let options = QueryOptions::top_k(10);

    for size in [100, 1000, 10000].iter() {
        let db = VectorDb::with_entries(CosineSimilarity, create_random_entries(*size, 128)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| db.query(black_box(&query), black_box(&options)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_partition_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_threshold");
    let entries = create_random_entries(10_000, 128);
    let query = vec![0.5f32; 128];
    let options = QueryOptions::top_k(10);

    for threshold in [25, 100, 400, usize::MAX] {
        let db = VectorDb::with_entries(CosineSimilarity, entries.clone())
            .unwrap()
            .with_partition_threshold(threshold);

        group.bench_with_input(BenchmarkId::from_parameter(threshold), &threshold, |b, _| {
            b.iter(|| db.query(black_box(&query), black_box(&options)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_upsert(c: &mut Criterion) {
    let entries = create_random_entries(1_000, 128);

    c.bench_function("upsert_1000_128d", |b| {
        b.iter(|| {
            let db = VectorDb::new(CosineSimilarity);
            for entry in entries.iter().rev() {
                db.upsert(entry.clone());
            }
        });
    });
}

criterion_group!(benches, benchmark_query, benchmark_partition_threshold, benchmark_upsert);
criterion_main!(benches);
