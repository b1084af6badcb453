//! Decoded scalar grids.

use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;
use crate::error::{AqError, AqResult};

/// Shape and placement of a regular lat/lon grid.
///
/// Row 0 lies on `bounds.lat_min`, column 0 on `bounds.lon_min`; the last
/// row and column lie on the max edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMeta {
    pub rows: usize,
    pub cols: usize,
    pub bounds: GeoBounds,
}

impl GridMeta {
    pub fn new(rows: usize, cols: usize, bounds: GeoBounds) -> AqResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(AqError::InvalidShape { rows, cols });
        }
        Ok(Self { rows, cols, bounds })
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An immutable row-major float32 grid with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    meta: GridMeta,
    values: Vec<f32>,
}

impl Grid {
    /// Build a grid, checking that `values` matches the shape.
    pub fn new(meta: GridMeta, values: Vec<f32>) -> AqResult<Self> {
        if values.len() != meta.len() {
            return Err(AqError::ValueCount {
                expected: meta.len(),
                actual: values.len(),
            });
        }
        Ok(Self { meta, values })
    }

    pub fn meta(&self) -> &GridMeta {
        &self.meta
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn rows(&self) -> usize {
        self.meta.rows
    }

    pub fn cols(&self) -> usize {
        self.meta.cols
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.meta.bounds
    }

    /// Get the value at a grid coordinate.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.meta.rows || col >= self.meta.cols {
            return None;
        }
        self.values.get(row * self.meta.cols + col).copied()
    }

    /// Min and max over finite values, `None` when no value is finite.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> GeoBounds {
        GeoBounds::new(-60.0, 60.0, -130.0, -30.0).unwrap()
    }

    #[test]
    fn test_value_count_checked() {
        let meta = GridMeta::new(2, 2, bounds()).unwrap();
        let err = Grid::new(meta, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            AqError::ValueCount {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_zero_shape_rejected() {
        assert!(GridMeta::new(0, 4, bounds()).is_err());
    }

    #[test]
    fn test_value_at_row_major() {
        let meta = GridMeta::new(2, 3, bounds()).unwrap();
        let grid = Grid::new(meta, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]).unwrap();
        assert_eq!(grid.value_at(1, 2), Some(12.0));
        assert_eq!(grid.value_at(0, 1), Some(1.0));
        assert_eq!(grid.value_at(2, 0), None);
    }

    #[test]
    fn test_value_range_skips_nan() {
        let meta = GridMeta::new(1, 4, bounds()).unwrap();
        let grid = Grid::new(meta, vec![f32::NAN, 12.0, 60.0, 10.0]).unwrap();
        assert_eq!(grid.value_range(), Some((10.0, 60.0)));

        let empty = Grid::new(GridMeta::new(1, 1, bounds()).unwrap(), vec![f32::NAN]).unwrap();
        assert_eq!(empty.value_range(), None);
    }
}
