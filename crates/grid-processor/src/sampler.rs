//! Bilinear sampling of a grid at geographic coordinates.

use aq_common::Grid;

/// Fractional indices this close to an integer are snapped onto it.
const SNAP_EPSILON: f64 = 1e-9;

/// Result of sampling a grid at one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f64),
    /// Location lies outside the grid bounds
    OutOfBounds,
    /// A contributing grid cell holds no data (NaN)
    NoData,
}

impl Sample {
    pub fn value(&self) -> Option<f64> {
        match self {
            Sample::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Sample `grid` at `(lat, lon)`.
///
/// Row 0 lies at `lat_min` and column 0 at `lon_min`. Grid vertices return
/// their stored value exactly.
pub fn sample(grid: &Grid, lat: f64, lon: f64) -> Sample {
    let bounds = grid.bounds();
    if !bounds.contains(lat, lon) {
        return Sample::OutOfBounds;
    }

    let y = fractional_index(lat, bounds.lat_min, bounds.lat_max, grid.rows());
    let x = fractional_index(lon, bounds.lon_min, bounds.lon_max, grid.cols());

    match bilinear_interpolate(grid.values(), grid.cols(), grid.rows(), x, y) {
        Some(v) => Sample::Value(v),
        None => Sample::NoData,
    }
}

/// Position of `value` along an axis of `n` samples spanning `[min, max]`.
///
/// The result lies in `[0, n - 1]`.
pub fn fractional_index(value: f64, min: f64, max: f64, n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let last = (n - 1) as f64;
    let f = (value - min) * last / (max - min);
    let nearest = f.round();
    let f = if (f - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        f
    };
    f.clamp(0.0, last)
}

/// Bilinear interpolation in index space.
///
/// `x` is the fractional column and `y` the fractional row. Returns `None`
/// outside the array or when a contributing cell is NaN. Zero fractions skip
/// the neighbour entirely, so exact indices return the stored value.
pub fn bilinear_interpolate(
    data: &[f32],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
) -> Option<f64> {
    if width == 0 || height == 0 || data.len() < width * height {
        return None;
    }
    if !(x >= 0.0 && y >= 0.0) {
        return None;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    if x0 >= width || y0 >= height {
        return None;
    }
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = x - x0 as f64;
    let yf = y - y0 as f64;

    let at = |row: usize, col: usize| data[row * width + col] as f64;
    let along_row = |row: usize| {
        if xf == 0.0 {
            at(row, x0)
        } else {
            at(row, x0) * (1.0 - xf) + at(row, x1) * xf
        }
    };

    let v = if yf == 0.0 {
        along_row(y0)
    } else {
        along_row(y0) * (1.0 - yf) + along_row(y1) * yf
    };

    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilinear_center() {
        let data = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.5, 0.5), Some(15.0));
    }

    #[test]
    fn test_bilinear_exact_index() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(bilinear_interpolate(&data, 3, 2, 2.0, 1.0), Some(6.0));
        assert_eq!(bilinear_interpolate(&data, 3, 2, 1.0, 0.0), Some(2.0));
    }

    #[test]
    fn test_bilinear_outside_array() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(bilinear_interpolate(&data, 2, 2, 2.0, 0.0), None);
        assert_eq!(bilinear_interpolate(&data, 2, 2, -0.1, 0.0), None);
        assert_eq!(bilinear_interpolate(&data, 2, 2, f64::NAN, 0.0), None);
    }

    #[test]
    fn test_nan_only_matters_when_it_contributes() {
        let data = [1.0, f32::NAN, 3.0, 4.0];
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 1.0), Some(3.0));
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.5, 0.0), None);
    }

    #[test]
    fn test_fractional_index_snaps() {
        assert_eq!(fractional_index(60.0, -60.0, 60.0, 4), 3.0);
        assert_eq!(fractional_index(-60.0, -60.0, 60.0, 4), 0.0);
        assert_eq!(fractional_index(0.0, -60.0, 60.0, 4), 1.5);
        // -20 maps to 1.0 only up to rounding error
        assert_eq!(fractional_index(-20.0, -60.0, 60.0, 4), 1.0);
        assert_eq!(fractional_index(5.0, 0.0, 10.0, 1), 0.0);
    }

    #[test]
    fn test_sample_value_accessor() {
        assert_eq!(Sample::Value(2.5).value(), Some(2.5));
        assert_eq!(Sample::OutOfBounds.value(), None);
        assert_eq!(Sample::NoData.value(), None);
    }
}
