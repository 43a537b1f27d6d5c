//! Shared presentation: themes, value formatting and text rendering.

pub mod formatters;
mod theme;
pub mod tree_text;

pub use theme::{Theme, ThemeColors};
