//! N-dimensional projection engine.
//!
//! A [`ProjectionState`] remembers, for one loaded array, which axes are
//! displayed ("free") and at which index every other axis is held. It reduces
//! the array to a line or a grid:
//!
//! - one free axis gives a line,
//! - two free axes give a grid ordered (row, col),
//! - more than two free axes form a contiguous window whose leading axes are
//!   tiled side by side.
//!
//! The state never touches colors. Color normalization uses the global range
//! of the loaded variable, so projections of the same array stay comparable.

pub mod slice;

use crate::error::{GyreError, Result};
use ndarray::{Array1, Array2, ArrayD};

/// How the free axes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// A single free axis.
    Line,
    /// Two or more free axes.
    Contour,
}

impl PlotMode {
    /// Get display name.
    pub fn name(self) -> &'static str {
        match self {
            PlotMode::Line => "Line",
            PlotMode::Contour => "Contour",
        }
    }
}

/// Result of a projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    /// Values along one axis.
    Line(Array1<f64>),
    /// Values over (row, col).
    Grid(Array2<f64>),
}

/// Projection settings for one array.
#[derive(Debug, Clone)]
pub struct ProjectionState {
    shape: Vec<usize>,
    dim_names: Vec<String>,
    mode: PlotMode,
    free_axes: Vec<usize>,
    slice_indices: Vec<usize>,
    active_axis: Option<usize>,
}

impl ProjectionState {
    /// Default projection for an array of `shape`.
    pub fn new(shape: &[usize], dim_names: &[String]) -> Self {
        let rank = shape.len();
        let (mode, free_axes) = match rank {
            0 => (PlotMode::Line, Vec::new()),
            1 => (PlotMode::Line, vec![0]),
            _ => (PlotMode::Contour, vec![rank - 2, rank - 1]),
        };
        let mut state = Self {
            shape: shape.to_vec(),
            dim_names: dim_names.to_vec(),
            mode,
            free_axes,
            slice_indices: vec![0; rank],
            active_axis: None,
        };
        state.fix_active_axis();
        state
    }

    /// Number of axes of the array.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Current plot mode.
    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    /// Free axes. With two, the order is (row, col).
    pub fn free_axes(&self) -> &[usize] {
        &self.free_axes
    }

    /// Held index of every axis.
    pub fn slice_indices(&self) -> &[usize] {
        &self.slice_indices
    }

    /// Axis stepped by [`step_active_slice`](Self::step_active_slice).
    pub fn active_axis(&self) -> Option<usize> {
        self.active_axis
    }

    /// Whether the free axes form a tiled window.
    pub fn is_tiled(&self) -> bool {
        self.free_axes.len() > 2
    }

    /// Axes that are held at a slice index, ascending.
    pub fn fixed_axes(&self) -> Vec<usize> {
        (0..self.rank()).filter(|a| !self.free_axes.contains(a)).collect()
    }

    fn axis_name(&self, axis: usize) -> String {
        self.dim_names
            .get(axis)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("dim_{}", axis))
    }

    fn clamp_index(&self, axis: usize, index: usize) -> usize {
        index.min(self.shape[axis].saturating_sub(1))
    }

    fn is_contiguous(&self) -> bool {
        self.free_axes.windows(2).all(|w| w[1] == w[0] + 1)
    }

    fn set_window(&mut self, start: usize, count: usize) {
        self.free_axes = (start..start + count).collect();
        self.mode = if count >= 2 { PlotMode::Contour } else { PlotMode::Line };
        self.fix_active_axis();
    }

    fn fix_active_axis(&mut self) {
        let fixed = self.fixed_axes();
        if !self.active_axis.is_some_and(|a| fixed.contains(&a)) {
            self.active_axis = fixed.first().copied();
        }
    }

    /// Hold `axis` at `index`, clamped to the axis extent.
    pub fn set_slice(&mut self, axis: usize, index: usize) {
        if axis < self.rank() {
            self.slice_indices[axis] = self.clamp_index(axis, index);
        }
    }

    /// Move the free axes by `delta`.
    ///
    /// A contiguous window wraps within `[0, rank - count]`. Any other pair
    /// shifts each axis modulo the rank.
    pub fn shift_window(&mut self, delta: isize) {
        let rank = self.rank();
        let count = self.free_axes.len();
        if count == 0 || count == rank {
            return;
        }

        if self.is_contiguous() {
            let positions = (rank - count + 1) as isize;
            let start = (self.free_axes[0] as isize + delta).rem_euclid(positions) as usize;
            self.set_window(start, count);
        } else {
            for axis in &mut self.free_axes {
                *axis = (*axis as isize + delta).rem_euclid(rank as isize) as usize;
            }
            self.fix_active_axis();
        }
    }

    /// Add one axis to the free window, keeping its start when possible.
    pub fn grow_window(&mut self) {
        let rank = self.rank();
        let count = self.free_axes.len();
        if count == 0 || count >= rank {
            return;
        }
        let count = count + 1;
        let start = self.free_axes.iter().copied().min().unwrap_or(0).min(rank - count);
        self.set_window(start, count);
    }

    /// Drop the last axis of the free window.
    pub fn shrink_window(&mut self) {
        let count = self.free_axes.len();
        if count <= 1 {
            return;
        }
        if count == 2 {
            self.free_axes.truncate(1);
            self.mode = PlotMode::Line;
            self.fix_active_axis();
        } else {
            let start = self.free_axes[0];
            self.set_window(start, count - 1);
        }
    }

    /// Swap row and column. Ignored unless exactly two axes are free.
    pub fn transpose(&mut self) {
        if self.free_axes.len() == 2 {
            self.free_axes.swap(0, 1);
        }
    }

    /// Choose the free axes explicitly.
    pub fn set_free_axes(&mut self, axes: &[usize]) -> Result<()> {
        let rank = self.rank();
        if axes.is_empty() || axes.len() > rank {
            return Err(GyreError::InvalidProjection(format!(
                "{} free axes for a rank-{} array",
                axes.len(),
                rank
            )));
        }
        if let Some(&bad) = axes.iter().find(|&&a| a >= rank) {
            return Err(GyreError::InvalidProjection(format!("axis {} out of range", bad)));
        }
        for (i, a) in axes.iter().enumerate() {
            if axes[..i].contains(a) {
                return Err(GyreError::InvalidProjection(format!("axis {} repeated", a)));
            }
        }
        if axes.len() > 2 && !axes.windows(2).all(|w| w[1] == w[0] + 1) {
            return Err(GyreError::InvalidProjection(
                "a window of more than two axes must be contiguous and ascending".to_string(),
            ));
        }

        self.free_axes = axes.to_vec();
        self.mode = if axes.len() == 1 { PlotMode::Line } else { PlotMode::Contour };
        self.fix_active_axis();
        Ok(())
    }

    /// Switch between Line and Contour.
    ///
    /// Line keeps the column axis. Contour pairs the line axis with the axis
    /// before it, or the one after it for axis 0.
    pub fn toggle_mode(&mut self) {
        if self.rank() < 2 {
            return;
        }
        match self.mode {
            PlotMode::Contour => {
                if let Some(&col) = self.free_axes.last() {
                    self.free_axes = vec![col];
                }
                self.mode = PlotMode::Line;
            },
            PlotMode::Line => {
                let axis = self.free_axes.first().copied().unwrap_or(0);
                self.free_axes = if axis == 0 { vec![0, 1] } else { vec![axis - 1, axis] };
                self.mode = PlotMode::Contour;
            },
        }
        self.fix_active_axis();
    }

    /// Select the next held axis for stepping.
    pub fn cycle_active_axis(&mut self) {
        let fixed = self.fixed_axes();
        self.active_axis = match self.active_axis.and_then(|a| fixed.iter().position(|&f| f == a)) {
            Some(pos) => fixed.get((pos + 1) % fixed.len()).copied(),
            None => fixed.first().copied(),
        };
    }

    /// Move the index of the active axis by `delta`, clamped.
    pub fn step_active_slice(&mut self, delta: isize) {
        if let Some(axis) = self.active_axis {
            let index = self.slice_indices[axis].saturating_add_signed(delta);
            self.set_slice(axis, index);
        }
    }

    /// Reduce `data` to a line or grid.
    pub fn project(&self, data: &ArrayD<f64>) -> Result<Projected> {
        if data.shape() != self.shape.as_slice() {
            return Err(GyreError::InvalidProjection(format!(
                "array shape {:?} does not match projection shape {:?}",
                data.shape(),
                self.shape
            )));
        }

        // A held axis of extent 0 has no index to hold.
        if self.fixed_axes().iter().any(|&a| self.shape[a] == 0) {
            return Ok(match self.free_axes.len() {
                0 | 1 => Projected::Line(Array1::zeros(0)),
                _ => Projected::Grid(Array2::zeros((0, 0))),
            });
        }

        let fixed: Vec<(usize, usize)> = self
            .fixed_axes()
            .into_iter()
            .map(|a| (a, self.clamp_index(a, self.slice_indices[a])))
            .collect();
        let view = slice::fix_axes(data.view(), &fixed);

        match self.free_axes.as_slice() {
            [] | [_] => Ok(Projected::Line(slice::to_line(view)?)),
            [row, col] => Ok(Projected::Grid(slice::to_grid(view, row > col)?)),
            _ => Ok(Projected::Grid(slice::tile(view)?)),
        }
    }

    /// One-line summary such as `Plot: lat × lon | Slice: time=0`.
    pub fn describe(&self) -> String {
        if self.rank() == 0 {
            return "Plot: scalar".to_string();
        }

        let names: Vec<String> = self.free_axes.iter().map(|&a| self.axis_name(a)).collect();
        let plot = match names.len() {
            1 => format!("Plot: {} (1D)", names[0]),
            2 => format!("Plot: {}", names.join(" × ")),
            _ => format!("Plot: {} (tiled)", names.join(" × ")),
        };

        let slices: Vec<String> = self
            .fixed_axes()
            .into_iter()
            .map(|a| format!("{}={}", self.axis_name(a), self.slice_indices[a]))
            .collect();
        if slices.is_empty() {
            plot
        } else {
            format!("{} | Slice: {}", plot, slices.join(", "))
        }
    }
}
