//! Concurrent entry storage kept sorted by identifier

use crate::config::StoreConfig;
use crate::distance::DistanceMetric;
use crate::entry::{Entry, Id};
use crate::error::{Result, VectorDbError};
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory vector store.
///
/// Entries live in a single `Vec` ordered ascending by [`Id`] with no
/// duplicates, guarded by one reader/writer lock. Lookups and queries share
/// the read side; [`upsert`](Self::upsert) and [`delete`](Self::delete) take
/// the write side for their whole duration.
#[derive(Debug)]
pub struct VectorDb<M> {
    pub(crate) entries: RwLock<Vec<Arc<Entry<M>>>>,
    pub(crate) metric: Box<dyn DistanceMetric>,
    pub(crate) partition_threshold: usize,
}

impl<M> VectorDb<M> {
    /// Create an empty store with the given metric and default settings.
    pub fn new(metric: impl DistanceMetric + 'static) -> Self {
        Self::with_metric(Box::new(metric), StoreConfig::default().partition_threshold)
    }

    /// Create an empty store from a configuration.
    pub fn from_config(config: StoreConfig) -> Self {
        let config = config.validated();
        Self::with_metric(config.metric.build(), config.partition_threshold)
    }

    fn with_metric(metric: Box<dyn DistanceMetric>, partition_threshold: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            metric,
            partition_threshold: partition_threshold.max(1),
        }
    }

    /// Create a store pre-populated with `entries`.
    ///
    /// The entries must already be sorted ascending by id without
    /// duplicates; anything else is rejected with `UnsortedEntries`.
    pub fn with_entries(
        metric: impl DistanceMetric + 'static,
        entries: Vec<Entry<M>>,
    ) -> Result<Self> {
        if let Some(index) = entries
            .windows(2)
            .position(|pair| pair[0].id >= pair[1].id)
        {
            return Err(VectorDbError::UnsortedEntries { index: index + 1 });
        }
        let db = Self::new(metric);
        *db.entries.write() = entries.into_iter().map(Arc::new).collect();
        Ok(db)
    }

    /// Override the partition size below which queries stop forking.
    pub fn with_partition_threshold(mut self, threshold: usize) -> Self {
        self.partition_threshold = threshold.max(1);
        self
    }

    /// Position of `id`, or the index it would be inserted at.
    fn search(entries: &[Arc<Entry<M>>], id: &str) -> std::result::Result<usize, usize> {
        entries.binary_search_by(|e| e.id.as_str().cmp(id))
    }

    /// Insert `entry`, replacing any existing entry with the same id.
    pub fn upsert(&self, entry: Entry<M>) {
        let entry = Arc::new(entry);
        let mut entries = self.entries.write();
        Self::upsert_locked(&mut entries, entry);
    }

    /// Upsert many entries under a single write lock.
    pub fn upsert_all(&self, batch: impl IntoIterator<Item = Entry<M>>) {
        let mut entries = self.entries.write();
        let mut count = 0usize;
        for entry in batch {
            Self::upsert_locked(&mut entries, Arc::new(entry));
            count += 1;
        }
        tracing::debug!(count, total = entries.len(), "bulk upsert");
    }

    fn upsert_locked(entries: &mut Vec<Arc<Entry<M>>>, entry: Arc<Entry<M>>) {
        match Self::search(entries, entry.id.as_str()) {
            Ok(n) => {
                tracing::trace!(id = %entry.id, "replacing entry");
                entries[n] = entry;
            }
            Err(n) => {
                tracing::trace!(id = %entry.id, position = n, "inserting entry");
                entries.insert(n, entry);
            }
        }
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<Arc<Entry<M>>> {
        let entries = self.entries.read();
        Self::search(&entries, id)
            .ok()
            .map(|n| Arc::clone(&entries[n]))
    }

    /// Remove the entry with `id`. Returns whether an entry was removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut entries = self.entries.write();
        match Self::search(&entries, id) {
            Ok(n) => {
                entries.remove(n);
                tracing::debug!(id, remaining = entries.len(), "deleted entry");
                true
            }
            Err(_) => false,
        }
    }

    /// Get the number of entries in the store
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All ids, in ascending order.
    pub fn ids(&self) -> Vec<Id> {
        self.entries.read().iter().map(|e| e.id.clone()).collect()
    }

    /// A point-in-time copy of the entry list, in id order.
    pub fn snapshot(&self) -> Vec<Arc<Entry<M>>> {
        self.entries.read().clone()
    }

    /// Dimension of the first stored vector, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.read().first().map(|e| e.vector.dimension())
    }

    /// The distance metric used by this store.
    pub fn metric(&self) -> &dyn DistanceMetric {
        self.metric.as_ref()
    }

    pub fn partition_threshold(&self) -> usize {
        self.partition_threshold
    }
}
