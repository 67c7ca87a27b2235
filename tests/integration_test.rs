//! Integration tests for the vector database

use sorted_vectordb::{
    CosineDistance, DotProduct, Entry, Euclidean, QueryOptions, StoreConfig, VectorDb,
    VectorDbError,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_basic_workflow() {
    let db = VectorDb::new(Euclidean);

    db.upsert(Entry::new("v1", vec![1.0, 0.0, 0.0], "x"));
    db.upsert(Entry::new("v2", vec![0.0, 1.0, 0.0], "y"));
    db.upsert(Entry::new("v3", vec![0.0, 0.0, 1.0], "z"));
    assert_eq!(db.len(), 3);

    let results = db.query(&[1.0, 0.1, 0.0], &QueryOptions::top_k(2)).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].entry.id.as_str(), "v1");
    assert_eq!(results[0].entry.metadata, "x");

    assert!(db.delete("v2"));
    assert_eq!(db.len(), 2);
    assert!(!db.delete("v2"));
}

#[test]
fn test_query_sees_latest_upsert() {
    let db = VectorDb::new(DotProduct);
    db.upsert(Entry::bare("a", vec![1.0, 0.0]));
    db.upsert(Entry::bare("b", vec![0.5, 0.0]));

    let top = db.query(&[1.0, 0.0], &QueryOptions::top_k(1)).unwrap();
    assert_eq!(top[0].entry.id.as_str(), "a");

    db.upsert(Entry::bare("b", vec![2.0, 0.0]));
    let top = db.query(&[1.0, 0.0], &QueryOptions::top_k(1)).unwrap();
    assert_eq!(top[0].entry.id.as_str(), "b");
}

#[test]
fn test_predicate_on_metadata() {
    let db = VectorDb::new(CosineDistance);
    db.upsert(Entry::new("1", vec![1.0, 2.0, 3.0], Some("Jeff")));
    db.upsert(Entry::new("2", vec![4.0, 5.0, 6.0], Some("Marc")));
    db.upsert(Entry::new("3", vec![7.0, 8.0, 9.0], Some("Grant")));
    db.upsert(Entry::new("4", vec![13.0, 14.0, 15.0], None));

    let options = QueryOptions::<Option<&str>>::top_k(30)
        .with_predicate(|e| matches!(e.metadata, Some(name) if name != "Grant"));
    let results = db.query(&[1.0, 2.0, 3.0], &options).unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn test_configured_store() {
    let config = StoreConfig {
        metric: sorted_vectordb::Metric::Dot,
        partition_threshold: 4,
    };
    let db = VectorDb::from_config(config);
    for i in 0..64 {
        db.upsert(Entry::bare(format!("{:03}", i), vec![i as f32, 1.0]));
    }
    let results = db.query(&[1.0, 0.0], &QueryOptions::top_k(3)).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.entry.id.as_str()).collect();
    assert_eq!(ids, vec!["063", "062", "061"]);
}

#[test]
fn test_mismatched_query_is_an_error_not_a_score() {
    let db = VectorDb::new(DotProduct);
    db.upsert(Entry::bare("a", vec![1.0, 0.0]));
    assert!(matches!(
        db.query(&[1.0, 0.0, 0.0], &QueryOptions::top_k(1)),
        Err(VectorDbError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_concurrent_queries_and_mutations() {
    let db = Arc::new(VectorDb::new(DotProduct).with_partition_threshold(16));
    for i in 0..500 {
        db.upsert(Entry::bare(format!("base{:04}", i), vec![1.0, i as f32 / 500.0]));
    }

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..200 {
                    let id = format!("w{}-{:03}", w, i);
                    db.upsert(Entry::bare(id.clone(), vec![0.5, 0.5]));
                    if i % 2 == 0 {
                        db.delete(&id);
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for _ in 0..50 {
                    let results = db.query(&[1.0, 1.0], &QueryOptions::top_k(10)).unwrap();
                    assert_eq!(results.len(), 10);
                    for pair in results.windows(2) {
                        assert!(pair[0].score >= pair[1].score);
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(db.len(), 500 + 4 * 100);
    let ids = db.ids();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_queries_from_rayon_pool_with_concurrent_writer() {
    let db = Arc::new(VectorDb::new(DotProduct).with_partition_threshold(2));
    db.upsert_all((0..2_000).map(|i| Entry::bare(format!("base{:05}", i), vec![1.0, i as f32])));

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let db = Arc::clone(&db);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut i = 0u64;
            while !stop.load(Ordering::Relaxed) {
                db.upsert(Entry::bare(format!("w{:08}", i % 500), vec![0.0, -1.0]));
                i += 1;
            }
        })
    };

    let answered = (0..3_000)
        .into_par_iter()
        .map(|_| {
            let results = db.query(&[0.0, 1.0], &QueryOptions::top_k(3)).unwrap();
            assert_eq!(results[0].entry.id.as_str(), "base01999");
            results.len()
        })
        .filter(|&n| n == 3)
        .count();

    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
    assert_eq!(answered, 3_000);
}
