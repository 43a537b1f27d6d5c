//! Loaded variable values.

use super::backend::{Encoding, RawVariable};
use super::Attributes;
use ndarray::ArrayD;

/// Loaded variable with its data and metadata.
#[derive(Debug, Clone)]
pub struct LoadedVariable {
    /// Variable name.
    pub name: String,
    /// Variable path.
    pub path: String,
    /// Shape of the data.
    pub shape: Vec<usize>,
    /// Dimension names.
    pub dim_names: Vec<String>,
    /// Element type of the stored values.
    pub dtype: String,
    /// Variable attributes.
    pub attributes: Attributes,
    /// Value of the `units` attribute, if any.
    pub units: Option<String>,
    /// Physical values; missing entries are NaN.
    pub data: ArrayD<f64>,
    /// Finite minimum and maximum over the whole array.
    pub min_max: Option<(f64, f64)>,
    /// Count of finite values.
    pub valid_count: usize,
}

impl LoadedVariable {
    /// Mask fill values, unpack and compute the global range.
    pub fn from_raw(name: impl Into<String>, path: impl Into<String>, raw: RawVariable) -> Self {
        let RawVariable {
            mut data,
            dim_names,
            dtype,
            attributes,
            encoding,
        } = raw;

        sanitize(&mut data, &encoding);
        let (min_max, valid_count) = global_range(&data);

        Self {
            name: name.into(),
            path: path.into(),
            shape: data.shape().to_vec(),
            dim_names,
            dtype,
            units: attributes.get("units").cloned(),
            attributes,
            data,
            min_max,
            valid_count,
        }
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Total number of elements.
    pub fn total_elements(&self) -> usize {
        self.data.len()
    }
}

/// Replace fill values with NaN, then apply `scale_factor` and `add_offset`.
pub fn sanitize(data: &mut ArrayD<f64>, encoding: &Encoding) {
    if !encoding.fill_values.is_empty() {
        data.mapv_inplace(|v| {
            if encoding.fill_values.iter().any(|&f| is_fill(v, f)) {
                f64::NAN
            } else {
                v
            }
        });
    }

    if encoding.is_packed() {
        let (scale, offset) = (encoding.scale_factor, encoding.add_offset);
        data.mapv_inplace(|v| v * scale + offset);
    }
}

/// Stored floats may have lost precision on the way to f64.
fn is_fill(value: f64, fill: f64) -> bool {
    if value == fill {
        return true;
    }
    fill.abs() > 1e30 && ((value - fill) / fill).abs() < 1e-6
}

/// Finite min/max and count of finite values.
pub fn global_range(data: &ArrayD<f64>) -> (Option<(f64, f64)>, usize) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut count = 0usize;
    for &v in data.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
        count += 1;
    }
    let range = if count > 0 { Some((min, max)) } else { None };
    (range, count)
}
