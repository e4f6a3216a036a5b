//! Coarse spatial bucketing used to measure how much ground a robot covers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors emitted by spatial index implementations.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// Indicates configuration values that cannot be used (e.g., non-positive cell size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Integer coordinates of one grid cell.
pub type CellCoord = (i64, i64);

/// Common behaviour exposed by visit-tracking indices.
pub trait VisitIndex {
    /// Record a world-space point, returning `true` when its cell was not seen before.
    fn record(&mut self, x: f32, y: f32) -> bool;

    /// Number of distinct cells recorded since the last reset.
    fn distinct(&self) -> usize;

    /// Forget every recorded cell.
    fn reset(&mut self);
}

/// Uniform grid that remembers which cells have been entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformGridIndex {
    /// Edge length of each grid cell used for bucketing positions.
    pub cell_size: f32,
    #[serde(skip)]
    visited: HashSet<CellCoord>,
}

impl UniformGridIndex {
    /// Create a new uniform grid with the provided cell size.
    pub fn new(cell_size: f32) -> Result<Self, IndexError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(IndexError::InvalidConfig("cell_size must be positive"));
        }
        Ok(Self {
            cell_size,
            visited: HashSet::new(),
        })
    }

    /// Cell containing the point; floors toward negative infinity.
    #[must_use]
    pub fn cell_of(&self, x: f32, y: f32) -> CellCoord {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Whether the cell containing the point has been recorded.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.visited.contains(&self.cell_of(x, y))
    }
}

impl Default for UniformGridIndex {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            visited: HashSet::new(),
        }
    }
}

impl VisitIndex for UniformGridIndex {
    fn record(&mut self, x: f32, y: f32) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let cell = self.cell_of(x, y);
        self.visited.insert(cell)
    }

    fn distinct(&self) -> usize {
        self.visited.len()
    }

    fn reset(&mut self) {
        self.visited.clear();
    }
}
