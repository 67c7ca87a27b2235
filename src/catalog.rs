//! JSON loaders for pre-computed catalog and prompt embeddings
//!
//! Catalog file: an array of `{"id": "...", "vector": [...], "metadata": {...}}`.
//! `metadata` is optional and is carried through untouched.
//!
//! Prompt file: an object mapping the id each prompt is expected to match to
//! a list of `{"prompt": "...", "vector": [...]}` cases.

use crate::entry::{Entry, Id};
use crate::error::Result;
use crate::vector::Vector;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogItem {
    id: Id,
    vector: Vector,
    #[serde(default)]
    metadata: Value,
}

/// One prompt whose best match should be a known entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptCase {
    pub prompt: String,
    pub vector: Vector,
}

/// Prompt cases grouped by the id they should rank first.
pub type PromptSet = BTreeMap<Id, Vec<PromptCase>>;

/// Parse catalog JSON into entries.
pub fn parse_catalog(json: &str) -> Result<Vec<Entry<Value>>> {
    let items: Vec<CatalogItem> = serde_json::from_str(json)?;
    Ok(items
        .into_iter()
        .map(|item| Entry::new(item.id, item.vector, item.metadata))
        .collect())
}

/// Load a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Entry<Value>>> {
    let path = path.as_ref();
    let entries = parse_catalog(&std::fs::read_to_string(path)?)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "loaded catalog");
    Ok(entries)
}

/// Parse prompt JSON.
pub fn parse_prompts(json: &str) -> Result<PromptSet> {
    Ok(serde_json::from_str(json)?)
}

/// Load a prompt file.
pub fn load_prompts(path: impl AsRef<Path>) -> Result<PromptSet> {
    let path = path.as_ref();
    let prompts = parse_prompts(&std::fs::read_to_string(path)?)?;
    tracing::debug!(
        path = %path.display(),
        prompts = prompts.values().map(Vec::len).sum::<usize>(),
        "loaded prompts"
    );
    Ok(prompts)
}
