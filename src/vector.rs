//! Vector type and parsing

use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of leading components shown by the `Display` impl.
const PREVIEW_LEN: usize = 3;

/// A fixed-length embedding in n-dimensional space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from a Vec<f32>
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// Parses a comma-separated list of floats, e.g. `"1.0, 2.0, 3.0"`.
impl FromStr for Vector {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(VectorDbError::InvalidVector {
                reason: "empty vector".to_string(),
            });
        }
        let data: Result<Vec<f32>> = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f32>()
                    .map_err(|_| VectorDbError::InvalidVector {
                        reason: format!("Invalid float: {}", x),
                    })
            })
            .collect();
        Ok(Vector::new(data?))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.data[..self.data.len().min(PREVIEW_LEN)];
        write!(f, "{:?}", shown)?;
        if self.data.len() > PREVIEW_LEN {
            write!(f, " (+{} more)", self.data.len() - PREVIEW_LEN)?;
        }
        Ok(())
    }
}
