//! Array reductions used by the projection engine.

use crate::error::{GyreError, Result};
use ndarray::{Array1, Array2, ArrayViewD, Axis, Ix1, Ix2};

fn invalid(err: ndarray::ShapeError) -> GyreError {
    GyreError::InvalidProjection(err.to_string())
}

/// Index every `(axis, index)` pair out of `view`.
///
/// Axes are removed from the highest down so the lower axis numbers stay
/// valid. Indices must already be clamped.
pub fn fix_axes<'a>(
    mut view: ArrayViewD<'a, f64>,
    fixed: &[(usize, usize)],
) -> ArrayViewD<'a, f64> {
    let mut fixed = fixed.to_vec();
    fixed.sort_unstable_by(|a, b| b.0.cmp(&a.0));
    for (axis, index) in fixed {
        view = view.index_axis_move(Axis(axis), index);
    }
    view
}

/// A one-axis view as an owned line. A scalar becomes a single element.
pub fn to_line(view: ArrayViewD<'_, f64>) -> Result<Array1<f64>> {
    if view.ndim() == 0 {
        return Ok(view.iter().copied().collect());
    }
    Ok(view.into_dimensionality::<Ix1>().map_err(invalid)?.to_owned())
}

/// A two-axis view as an owned grid, optionally transposed.
pub fn to_grid(view: ArrayViewD<'_, f64>, transpose: bool) -> Result<Array2<f64>> {
    let grid = view.into_dimensionality::<Ix2>().map_err(invalid)?;
    let grid = if transpose { grid.reversed_axes() } else { grid };
    Ok(grid.to_owned())
}

/// Lay the leading axes of a view with three or more axes out side by side.
///
/// The last two axes form each tile. All leading axes are flattened into the
/// tile index, and tile `k` occupies columns `k*cols .. (k+1)*cols`.
pub fn tile(view: ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
    let ndim = view.ndim();
    if ndim < 3 {
        return Err(GyreError::InvalidProjection(format!(
            "tiling needs at least 3 axes, got {}",
            ndim
        )));
    }

    let shape = view.shape();
    let (rows, cols) = (shape[ndim - 2], shape[ndim - 1]);
    let n_tiles: usize = shape[..ndim - 2].iter().product();

    let stacked = ndarray::Array3::from_shape_vec(
        (n_tiles, rows, cols),
        view.iter().copied().collect(),
    )
    .map_err(invalid)?;
    let side_by_side = stacked.permuted_axes([1, 0, 2]);

    Array2::from_shape_vec(
        (rows, n_tiles * cols),
        side_by_side.iter().copied().collect(),
    )
    .map_err(invalid)
}
