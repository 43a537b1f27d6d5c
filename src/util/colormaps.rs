//! Color mapping for data visualization.
//!
//! Colors are always normalized against the global range of the loaded
//! variable, so the same value keeps the same color across slices.

use ratatui::style::Color;

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// Viridis sampled at 16 evenly spaced stops.
pub const VIRIDIS: [Rgb; 16] = [
    Rgb(68, 1, 84),
    Rgb(72, 26, 108),
    Rgb(71, 47, 125),
    Rgb(65, 68, 135),
    Rgb(57, 86, 140),
    Rgb(49, 104, 142),
    Rgb(42, 120, 142),
    Rgb(35, 136, 142),
    Rgb(31, 152, 139),
    Rgb(34, 168, 132),
    Rgb(53, 183, 121),
    Rgb(83, 198, 105),
    Rgb(122, 209, 81),
    Rgb(165, 219, 54),
    Rgb(210, 226, 27),
    Rgb(253, 231, 37),
];

/// Stop used when the range is degenerate.
pub const MIDPOINT: usize = (VIRIDIS.len() - 1) / 2;

/// Map `value` to a viridis stop. NaN is treated as 0.
pub fn colorize(value: f64, min: f64, max: f64) -> Rgb {
    VIRIDIS[stop_index(value, min, max)]
}

/// Index into [`VIRIDIS`] for `value` within `[min, max]`.
pub fn stop_index(value: f64, min: f64, max: f64) -> usize {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return MIDPOINT;
    }
    let value = if value.is_nan() { 0.0 } else { value };
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    let last = VIRIDIS.len() - 1;
    ((t * last as f64).floor() as usize).min(last)
}

/// A color scale fixed to one global value range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ColorScale {
    /// Scale over `[min, max]`.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale over a precomputed range; a missing range is degenerate.
    pub fn from_range(range: Option<(f64, f64)>) -> Self {
        let (min, max) = range.unwrap_or((0.0, 0.0));
        Self { min, max }
    }

    /// Color of `value`.
    pub fn color(&self, value: f64) -> Rgb {
        colorize(value, self.min, self.max)
    }

    /// Whether every value maps to the midpoint.
    pub fn is_degenerate(&self) -> bool {
        !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_first_and_last_stop() {
        assert_eq!(colorize(0.0, 0.0, 10.0), VIRIDIS[0]);
        assert_eq!(colorize(10.0, 0.0, 10.0), VIRIDIS[15]);
        assert_eq!(colorize(-5.0, 0.0, 10.0), VIRIDIS[0]);
        assert_eq!(colorize(50.0, 0.0, 10.0), VIRIDIS[15]);
    }

    #[test]
    fn nan_is_treated_as_zero() {
        assert_eq!(colorize(f64::NAN, -10.0, 10.0), colorize(0.0, -10.0, 10.0));
        assert_eq!(stop_index(f64::NAN, -10.0, 10.0), 7);
    }

    #[test]
    fn degenerate_range_uses_midpoint() {
        for v in [-1e9, 0.0, 3.0, f64::NAN] {
            assert_eq!(colorize(v, 3.0, 3.0), VIRIDIS[7]);
            assert_eq!(colorize(v, f64::NAN, 1.0), VIRIDIS[7]);
        }
        assert!(ColorScale::from_range(None).is_degenerate());
    }

    #[test]
    fn global_range_gives_slice_independent_colors() {
        let scale = ColorScale::new(0.0, 100.0);
        // The same value maps to the same stop wherever it appears.
        let slice_a = [10.0, 50.0, 90.0];
        let slice_b = [50.0, 51.0, 52.0];
        assert_eq!(scale.color(slice_a[1]), scale.color(slice_b[0]));
        assert_ne!(scale.color(slice_b[0]), scale.color(slice_a[2]));
    }

    #[test]
    fn converts_to_terminal_color() {
        assert_eq!(Color::from(VIRIDIS[0]), Color::Rgb(68, 1, 84));
    }
}
