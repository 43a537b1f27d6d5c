//! Layout configuration constants for the projection viewer.

/// Configuration for the line plot.
#[derive(Debug, Clone)]
pub struct PlotLayoutConfig {
    /// Padding factor for the Y axis (0.15 = 15% margin).
    pub y_axis_padding_factor: f64,
    /// Columns reserved for Y-axis labels when fitting points to the width.
    pub label_columns: usize,
}

impl Default for PlotLayoutConfig {
    fn default() -> Self {
        Self {
            y_axis_padding_factor: 0.15,
            label_columns: 8,
        }
    }
}

/// Configuration for the heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapLayoutConfig {
    /// Height reserved for the colorbar.
    pub colorbar_height: u16,
    /// Width of the colorbar in characters.
    pub colorbar_width: usize,
    /// Width reserved left of the heatmap for row labels.
    pub left_margin: u16,
}

impl Default for HeatmapLayoutConfig {
    fn default() -> Self {
        Self {
            colorbar_height: 1,
            colorbar_width: 40,
            left_margin: 8,
        }
    }
}

/// Combined layout configuration.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Height of the variable header.
    pub header_height: u16,
    /// Height of the footer with projection summary and key help.
    pub footer_height: u16,
    /// Configuration for the line plot.
    pub plot: PlotLayoutConfig,
    /// Configuration for the heatmap.
    pub heatmap: HeatmapLayoutConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_height: 3,
            footer_height: 3,
            plot: PlotLayoutConfig::default(),
            heatmap: HeatmapLayoutConfig::default(),
        }
    }
}
