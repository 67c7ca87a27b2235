//! Store configuration

use crate::distance::Metric;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Partitions at or below this many entries are scored on a single thread.
pub const DEFAULT_PARTITION_THRESHOLD: usize = 100;

/// Configuration for a [`VectorDb`](crate::store::VectorDb).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Distance metric used for queries.
    pub metric: Metric,
    /// Largest partition scored sequentially before splitting in two.
    pub partition_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            partition_threshold: DEFAULT_PARTITION_THRESHOLD,
        }
    }
}

impl StoreConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: StoreConfig = serde_json::from_str(&raw)?;
        Ok(config.validated())
    }

    /// Clamp fields into their usable range.
    pub fn validated(mut self) -> Self {
        if self.partition_threshold == 0 {
            tracing::warn!("partition_threshold of 0 clamped to 1");
            self.partition_threshold = 1;
        }
        self
    }
}
