//! Gyre - lazy explorer and N-dimensional slice viewer for netCDF/HDF5 files.
//!
//! Gyre scans the structure of a scientific data file without reading any
//! values, resolves attributes for one node at a time, loads variables on
//! demand and reduces arrays of any rank to a line or a grid for display.
//!
//! # Features
//!
//! - Structure-only scans through an ordered chain of backends
//! - Path-addressable node tree with lazy attribute resolution
//! - Fill masking and CF scale/offset unpacking
//! - Projection of N-dimensional arrays, with tiling of extra axes
//! - Global-range viridis color scale
//!
//! # Example
//!
//! ```ignore
//! use gyre::data::DataReader;
//! use std::path::Path;
//!
//! let reader = DataReader::new();
//! let mut dataset = reader.scan_structure(Path::new("data.nc"))?;
//! reader.resolve_path(&mut dataset, "/")?;
//! println!("{} global attributes", dataset.global_attributes.len());
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod data;
pub mod error;
pub mod projection;
pub mod ui;
pub mod util;
pub mod viewer;
pub mod worker;

pub use error::{GyreError, Result};
