//! Backend engines able to read hierarchical array files.
//!
//! Every engine implements [`Backend`]. The reader keeps them in a fixed
//! priority order and falls back from one to the next; an engine reports
//! "cannot read this" through an ordinary `Err`.
//!
//! No engine keeps a handle open between calls. Each call opens the file and
//! walks the node path again, so paths built by [`child_path`] must be the
//! same strings the engines use to re-locate an object.
//!
//! [`child_path`]: super::child_path

mod flat;
mod grouped;
#[cfg(feature = "hdf5")]
mod hdf5;
mod nc;

pub use flat::FlatBackend;
pub use grouped::GroupedBackend;
#[cfg(feature = "hdf5")]
pub use self::hdf5::Hdf5Backend;

use super::{Attributes, DatasetInfo, NodeMetadata};
use crate::error::Result;
use ndarray::ArrayD;
use std::fmt;
use std::path::Path;

/// Maximum group nesting followed by a structure scan.
pub const MAX_GROUP_DEPTH: usize = 64;

/// Attributes and confirmed metadata of one node.
#[derive(Debug, Clone, Default)]
pub struct NodeDetails {
    /// Attributes of the located object.
    pub attributes: Attributes,
    /// Structural facts of the located object, if it has any.
    pub metadata: Option<NodeMetadata>,
}

/// How stored values map to physical values.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    /// Stored values that mean "missing".
    pub fill_values: Vec<f64>,
    /// Multiplier applied after masking.
    pub scale_factor: f64,
    /// Offset applied after scaling.
    pub add_offset: f64,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            fill_values: Vec::new(),
            scale_factor: 1.0,
            add_offset: 0.0,
        }
    }
}

impl Encoding {
    /// Read the CF encoding attributes. `default_fill` is used when the
    /// variable declares no `_FillValue`.
    pub fn from_attributes(attributes: &Attributes, default_fill: Option<f64>) -> Self {
        Self::from_lookup(
            |key| attributes.get(key).and_then(|s| parse_first_number(s)),
            default_fill,
        )
    }

    /// Build the encoding from a typed attribute lookup.
    pub fn from_lookup(number: impl Fn(&str) -> Option<f64>, default_fill: Option<f64>) -> Self {
        let mut fill_values = Vec::new();
        match number("_FillValue") {
            Some(fill) => fill_values.push(fill),
            None => fill_values.extend(default_fill),
        }
        if let Some(missing) = number("missing_value") {
            if !fill_values.contains(&missing) {
                fill_values.push(missing);
            }
        }

        Self {
            fill_values,
            scale_factor: number("scale_factor").unwrap_or(1.0),
            add_offset: number("add_offset").unwrap_or(0.0),
        }
    }

    /// Round fill values to single precision, matching how f32 data is widened.
    pub fn narrowed_to_f32(mut self) -> Self {
        for fill in &mut self.fill_values {
            *fill = f64::from(*fill as f32);
        }
        self
    }

    /// Whether values need unpacking.
    pub fn is_packed(&self) -> bool {
        self.scale_factor != 1.0 || self.add_offset != 0.0
    }
}

/// Parse a scalar or the first element of a rendered list such as `[1.5, 2.0]`.
pub(super) fn parse_first_number(s: &str) -> Option<f64> {
    let first = s
        .trim()
        .trim_start_matches('[')
        .split(',')
        .next()?
        .trim()
        .trim_end_matches(']');
    first.parse().ok()
}

/// Values of one variable as read by an engine, before sanitizing.
#[derive(Debug, Clone)]
pub struct RawVariable {
    /// Stored values converted to f64, in row-major order.
    pub data: ArrayD<f64>,
    /// Dimension name of each axis.
    pub dim_names: Vec<String>,
    /// Element type name.
    pub dtype: String,
    /// Attributes of the variable.
    pub attributes: Attributes,
    /// Fill and packing conventions.
    pub encoding: Encoding,
}

/// One engine able to read hierarchical array files.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Short tag recorded in [`DatasetInfo::backend_tag`].
    fn tag(&self) -> &'static str;

    /// Build the node tree with metadata but without attributes.
    fn scan_structure(&self, path: &Path) -> Result<DatasetInfo>;

    /// Locate `node_path` and read its attributes and metadata.
    fn load_attributes(&self, path: &Path, node_path: &str) -> Result<NodeDetails>;

    /// Locate the variable at `node_path` and read all of its values.
    fn load_values(&self, path: &Path, node_path: &str) -> Result<RawVariable>;
}

/// The default engine order.
pub fn default_backends() -> Vec<Box<dyn Backend>> {
    #[allow(unused_mut)]
    let mut backends: Vec<Box<dyn Backend>> =
        vec![Box::new(FlatBackend), Box::new(GroupedBackend)];
    #[cfg(feature = "hdf5")]
    backends.push(Box::new(Hdf5Backend));
    backends
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_reads_cf_attributes() {
        let mut attrs = Attributes::new();
        attrs.insert("_FillValue".into(), "-999".into());
        attrs.insert("missing_value".into(), "[-1, -2]".into());
        attrs.insert("scale_factor".into(), "0.5".into());

        let enc = Encoding::from_attributes(&attrs, Some(9.0));
        assert_eq!(enc.fill_values, vec![-999.0, -1.0]);
        assert_eq!(enc.scale_factor, 0.5);
        assert_eq!(enc.add_offset, 0.0);
        assert!(enc.is_packed());
    }

    #[test]
    fn default_fill_applies_without_explicit_fill() {
        let enc = Encoding::from_attributes(&Attributes::new(), Some(9.0));
        assert_eq!(enc.fill_values, vec![9.0]);
        assert!(!enc.is_packed());

        let enc = Encoding::from_attributes(&Attributes::new(), None);
        assert!(enc.fill_values.is_empty());
    }

    #[test]
    fn narrowed_fills_match_widened_f32_data() {
        let enc = Encoding {
            fill_values: vec![1e20, -999.9],
            ..Encoding::default()
        }
        .narrowed_to_f32();
        assert_eq!(enc.fill_values, vec![f64::from(1e20_f32), f64::from(-999.9_f32)]);
    }

    #[test]
    fn default_chain_starts_with_flat_engine() {
        let tags: Vec<&str> = default_backends().iter().map(|b| b.tag()).collect();
        assert_eq!(&tags[..2], &["netcdf-flat", "netcdf-grouped"]);
    }
}
