//! Distance metrics for vector similarity
//!
//! A metric produces a scalar score for two equal-length vectors and declares
//! which direction ranks as closer. The query engine derives every
//! comparison it makes (ordering, insertion position, minimum-score cutoff)
//! from [`DistanceMetric::bigger_is_closer`], so new metrics only need to
//! implement the trait.

use crate::error::{Result, VectorDbError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A pluggable similarity/distance function plus its ranking direction.
pub trait DistanceMetric: Debug + Send + Sync {
    /// Score `a` against `b`. Fails with `DimensionMismatch` when the
    /// lengths differ.
    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32>;

    /// Whether a higher score ranks as closer.
    fn bigger_is_closer(&self) -> bool;

    /// Whether score `a` ranks strictly closer than score `b`.
    fn is_better(&self, a: f32, b: f32) -> bool {
        if self.bigger_is_closer() {
            a > b
        } else {
            a < b
        }
    }

    /// Whether `score` is at least as close as the inclusive `minimum`.
    fn passes_cutoff(&self, score: f32, minimum: f32) -> bool {
        if self.bigger_is_closer() {
            score >= minimum
        } else {
            score <= minimum
        }
    }
}

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(VectorDbError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Raw cosine similarity, accumulated in `f64`.
fn cosine(a: &[f32], b: &[f32]) -> Result<f64> {
    check_dimensions(a, b)?;
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(VectorDbError::InvalidVector {
            reason: "Cannot compute cosine similarity with zero vector".to_string(),
        });
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Cosine similarity: `dot(a, b) / (|a| * |b|)`.
///
/// Ranks *lower* scores as closer. This is the long-standing ranking of this
/// metric and is kept as is; use [`CosineDistance`] for a metric where the
/// most similar vectors come first under the "lower is closer" convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl DistanceMetric for CosineSimilarity {
    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        Ok(cosine(a, b)? as f32)
    }

    fn bigger_is_closer(&self) -> bool {
        false
    }
}

/// Cosine distance: `1 - cosine similarity`, in `[0, 2]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistance;

impl DistanceMetric for CosineDistance {
    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        // Clamp to [-1, 1] to handle floating point errors
        let similarity = cosine(a, b)?.clamp(-1.0, 1.0);
        Ok((1.0 - similarity) as f32)
    }

    fn bigger_is_closer(&self) -> bool {
        false
    }
}

/// Dot product in single precision; higher is closer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotProduct;

impl DistanceMetric for DotProduct {
    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
    }

    fn bigger_is_closer(&self) -> bool {
        true
    }
}

/// Euclidean (L2) distance; lower is closer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        Ok(a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f32>()
            .sqrt())
    }

    fn bigger_is_closer(&self) -> bool {
        false
    }
}

/// Selects one of the built-in metrics from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Raw cosine similarity (lower ranks first)
    #[default]
    Cosine,
    /// 1 - cosine similarity
    CosineDistance,
    /// Dot product (higher ranks first)
    Dot,
    /// Euclidean (L2) distance
    Euclidean,
}

impl Metric {
    /// Construct the metric this selector names.
    pub fn build(self) -> Box<dyn DistanceMetric> {
        match self {
            Metric::Cosine => Box::new(CosineSimilarity),
            Metric::CosineDistance => Box::new(CosineDistance),
            Metric::Dot => Box::new(DotProduct),
            Metric::Euclidean => Box::new(Euclidean),
        }
    }
}
