//! netCDF fixtures written into a temporary directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Classic layout: two root dimensions, a `lat` coordinate variable, one
/// float variable with fill values and one packed short variable.
///
/// `lat(lat=3)` holds `[-10, 0, 10]`.
/// `temp(lat=3, lon=4)` holds `0..12` with index 5 set to `_FillValue = 1e20`
/// and index 6 set to `missing_value = -999.9`, both stored as f32.
/// `packed(lat=3)` stores `[0, 2, 4]` with `scale_factor = 0.5` and
/// `add_offset = 10`.
pub fn flat_file(dir: &Path) -> PathBuf {
    let path = dir.join("flat.nc");
    let mut file = netcdf::create(&path).unwrap();
    file.add_attribute("title", "flat fixture").unwrap();
    file.add_dimension("lat", 3).unwrap();
    file.add_dimension("lon", 4).unwrap();

    let mut lat = file.add_variable::<f32>("lat", &["lat"]).unwrap();
    lat.put_attribute("units", "degrees_north").unwrap();
    lat.put_values(&[-10.0f32, 0.0, 10.0], ..).unwrap();

    let mut temp = file.add_variable::<f32>("temp", &["lat", "lon"]).unwrap();
    temp.put_attribute("_FillValue", 1e20f32).unwrap();
    temp.put_attribute("missing_value", -999.9f32).unwrap();
    temp.put_attribute("units", "K").unwrap();
    let mut values: Vec<f32> = (0..12).map(|v| v as f32).collect();
    values[5] = 1e20;
    values[6] = -999.9;
    temp.put_values(&values, ..).unwrap();

    let mut packed = file.add_variable::<i16>("packed", &["lat"]).unwrap();
    packed.put_attribute("scale_factor", 0.5f64).unwrap();
    packed.put_attribute("add_offset", 10.0f64).unwrap();
    packed.put_values(&[0i16, 2, 4], ..).unwrap();

    path
}

/// Hierarchical layout whose root holds nothing but one group.
///
/// `/ocean/` has dimension `depth=5` and `salt(depth)` holding `[30, 31, 32,
/// 33, 34]`.
pub fn grouped_file(dir: &Path) -> PathBuf {
    let path = dir.join("grouped.nc");
    let mut file = netcdf::create(&path).unwrap();
    let mut ocean = file.add_group("ocean").unwrap();
    ocean.add_attribute("source", "model").unwrap();
    ocean.add_dimension("depth", 5).unwrap();
    let mut salt = ocean.add_variable::<f64>("salt", &["depth"]).unwrap();
    salt.put_attribute("units", "psu").unwrap();
    salt.put_values(&[30.0f64, 31.0, 32.0, 33.0, 34.0], ..).unwrap();
    path
}

/// A valid netCDF file without dimensions or variables.
pub fn empty_file(dir: &Path) -> PathBuf {
    let path = dir.join("empty.nc");
    let file = netcdf::create(&path).unwrap();
    drop(file);
    path
}
