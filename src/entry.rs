//! Identifier-keyed entries held by the store

use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, totally ordered entry identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored record: identifier, embedding and caller-defined metadata.
///
/// Entries are immutable; replacing one means upserting a new record under
/// the same id. The store never looks at `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<M> {
    pub id: Id,
    pub vector: Vector,
    pub metadata: M,
}

impl<M> Entry<M> {
    pub fn new(id: impl Into<Id>, vector: impl Into<Vector>, metadata: M) -> Self {
        Self {
            id: id.into(),
            vector: vector.into(),
            metadata,
        }
    }
}

impl Entry<()> {
    /// An entry with no metadata.
    pub fn bare(id: impl Into<Id>, vector: impl Into<Vector>) -> Self {
        Self::new(id, vector, ())
    }
}

impl<M: fmt::Debug> fmt::Display for Entry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID={}, Metadata={:?}, Vector={}",
            self.id, self.metadata, self.vector
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_as_strings() {
        let mut ids: Vec<Id> = ["b", "a", "ab", "B"].into_iter().map(Id::from).collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(Id::as_str).collect();
        assert_eq!(sorted, vec!["B", "a", "ab", "b"]);
    }

    #[test]
    fn test_entry_display() {
        let entry = Entry::new("tool", vec![1.0, 2.0], "meta");
        assert_eq!(entry.to_string(), "ID=tool, Metadata=\"meta\", Vector=[1.0, 2.0]");
    }
}
