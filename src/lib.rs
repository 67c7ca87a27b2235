//! # Sorted VectorDB
//!
//! A concurrent in-memory vector store for small-to-medium catalogs of
//! pre-computed embeddings.
//!
//! This library provides:
//! - An entry store kept sorted by id under a single reader/writer lock
//! - Pluggable distance metrics (Cosine, Dot Product, Euclidean)
//! - Exhaustive top-K search with parallel fork-join partitioning
//! - JSON catalog loading and a ranking report for the CLI
//!
//! ## Example
//!
//! ```rust
//! use sorted_vectordb::{DotProduct, Entry, QueryOptions, VectorDb};
//!
//! let db = VectorDb::new(DotProduct);
//! db.upsert(Entry::new("a", vec![1.0, 0.0], "first"));
//! db.upsert(Entry::new("b", vec![0.0, 1.0], "second"));
//!
//! let results = db.query(&[0.9, 0.1], &QueryOptions::top_k(1)).unwrap();
//! assert_eq!(results[0].entry.id.as_str(), "a");
//! ```

pub mod catalog;
pub mod config;
pub mod distance;
pub mod entry;
pub mod error;
pub mod query;
pub mod report;
pub mod store;
pub mod vector;

pub use config::StoreConfig;
pub use distance::{CosineDistance, CosineSimilarity, DistanceMetric, DotProduct, Euclidean, Metric};
pub use entry::{Entry, Id};
pub use error::{Result, VectorDbError};
pub use query::{QueryOptions, QueryResult};
pub use store::VectorDb;
pub use vector::Vector;
