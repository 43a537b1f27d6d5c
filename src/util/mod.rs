//! Utility modules: color mapping and layout constants.

pub mod colormaps;
pub mod layout_config;
