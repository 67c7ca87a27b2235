//! Exhaustive top-K similarity search
//!
//! A query scores every entry in the store. The entry list is split in half
//! recursively until partitions are small enough to scan on one thread; the
//! halves run on the rayon pool via [`rayon::join`] and their sorted partial
//! results are merged on the way back up.
//!
//! Each scanned partition keeps at most `top_k` results, ordered best to
//! worst under the store's metric. Equal scores keep input order, and since
//! entries are sorted by id the smaller id wins a tie. The merge prefers the
//! left half on ties, so the final ranking does not depend on how the entries
//! were partitioned.

use crate::distance::DistanceMetric;
use crate::entry::Entry;
use crate::error::Result;
use crate::store::VectorDb;
use std::fmt;
use std::sync::Arc;

/// Number of results returned when a query does not say otherwise.
pub const DEFAULT_TOP_K: usize = 10;

/// A filter applied to each entry before it is scored.
pub type Predicate<M> = Arc<dyn Fn(&Entry<M>) -> bool + Send + Sync>;

/// Options controlling a single query.
pub struct QueryOptions<M> {
    /// Maximum number of results.
    pub top_k: usize,
    /// Inclusive score bound in the metric's direction: a floor when bigger
    /// is closer, a ceiling otherwise. `None` accepts every score.
    pub minimum_score: Option<f32>,
    /// Entries for which this returns `false` are skipped without scoring.
    pub predicate: Option<Predicate<M>>,
}

impl<M> QueryOptions<M> {
    pub fn top_k(top_k: usize) -> Self {
        Self {
            top_k,
            minimum_score: None,
            predicate: None,
        }
    }

    pub fn with_minimum_score(mut self, minimum_score: f32) -> Self {
        self.minimum_score = Some(minimum_score);
        self
    }

    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&Entry<M>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }
}

impl<M> Default for QueryOptions<M> {
    fn default() -> Self {
        Self::top_k(DEFAULT_TOP_K)
    }
}

impl<M> Clone for QueryOptions<M> {
    fn clone(&self) -> Self {
        Self {
            top_k: self.top_k,
            minimum_score: self.minimum_score,
            predicate: self.predicate.clone(),
        }
    }
}

impl<M> fmt::Debug for QueryOptions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("top_k", &self.top_k)
            .field("minimum_score", &self.minimum_score)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// A scored entry returned by a query.
#[derive(Debug)]
pub struct QueryResult<M> {
    pub score: f32,
    pub entry: Arc<Entry<M>>,
}

impl<M> Clone for QueryResult<M> {
    fn clone(&self) -> Self {
        Self {
            score: self.score,
            entry: Arc::clone(&self.entry),
        }
    }
}

impl<M: Send + Sync> VectorDb<M> {
    /// Return up to `options.top_k` entries closest to `vector`, best first.
    ///
    /// The entry list is copied once under the read lock and the lock is
    /// released before scoring starts, so the result reflects a single point
    /// between mutations and no guard is held across the fork-join.
    ///
    /// Fails with `DimensionMismatch` if `vector` and a scored entry differ
    /// in length. Under a cosine metric a zero-magnitude vector (query or
    /// stored) fails the whole call with `InvalidVector`, even if that entry
    /// would not have made the top K.
    pub fn query(&self, vector: &[f32], options: &QueryOptions<M>) -> Result<Vec<QueryResult<M>>> {
        if options.top_k == 0 {
            return Ok(Vec::new());
        }
        let entries = self.snapshot();
        tracing::debug!(
            entries = entries.len(),
            top_k = options.top_k,
            threshold = self.partition_threshold,
            "query"
        );

        let search = Search {
            metric: self.metric.as_ref(),
            query: vector,
            options,
            threshold: self.partition_threshold,
        };
        let mut results = search.partition(&entries)?;
        results.truncate(options.top_k);
        Ok(results)
    }
}

struct Search<'a, M> {
    metric: &'a dyn DistanceMetric,
    query: &'a [f32],
    options: &'a QueryOptions<M>,
    threshold: usize,
}

impl<M: Send + Sync> Search<'_, M> {
    fn partition(&self, entries: &[Arc<Entry<M>>]) -> Result<Vec<QueryResult<M>>> {
        if entries.len() <= self.threshold {
            return self.scan(entries);
        }
        // Left half gets the extra entry when the length is odd.
        let mid = entries.len() - entries.len() / 2;
        let (left, right) = entries.split_at(mid);
        tracing::trace!(left = left.len(), right = right.len(), "splitting partition");

        let (left, right) = rayon::join(|| self.partition(left), || self.partition(right));
        Ok(self.merge(left?, right?))
    }

    /// Score a partition sequentially, keeping the best `top_k` results.
    fn scan(&self, entries: &[Arc<Entry<M>>]) -> Result<Vec<QueryResult<M>>> {
        let top_k = self.options.top_k;
        let mut results: Vec<QueryResult<M>> = Vec::with_capacity(top_k.min(entries.len()) + 1);

        for entry in entries {
            if let Some(predicate) = &self.options.predicate {
                if !predicate(entry.as_ref()) {
                    continue;
                }
            }
            let score = self.metric.distance(self.query, entry.vector.as_slice())?;
            if let Some(minimum) = self.options.minimum_score {
                if !self.metric.passes_cutoff(score, minimum) {
                    continue;
                }
            }

            // After every kept result that scores at least as well.
            let n = results.partition_point(|r| !self.metric.is_better(score, r.score));
            if n == top_k {
                continue;
            }
            results.insert(
                n,
                QueryResult {
                    score,
                    entry: Arc::clone(entry),
                },
            );
            results.truncate(top_k);
        }
        Ok(results)
    }

    /// Merge two best-first lists. Ties take from `left`.
    fn merge(
        &self,
        left: Vec<QueryResult<M>>,
        right: Vec<QueryResult<M>>,
    ) -> Vec<QueryResult<M>> {
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();
        loop {
            let take_right = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => self.metric.is_better(r.score, l.score),
                (Some(_), None) => false,
                (None, Some(_)) => true,
                (None, None) => break,
            };
            let next = if take_right { right.next() } else { left.next() };
            merged.extend(next);
        }
        merged
    }
}
