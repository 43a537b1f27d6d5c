//! Projection viewer - pure rendering layer.

use super::ViewerState;
use crate::data::LoadedVariable;
use crate::projection::Projected;
use crate::ui::formatters::{format_number, format_shape, format_value};
use crate::ui::ThemeColors;
use crate::util::colormaps::{ColorScale, MIDPOINT, VIRIDIS};
use crate::util::layout_config::LayoutConfig;
use ndarray::{Array1, Array2};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

const KEY_HELP: &str =
    "m: Mode | h/l: Shift | +/-: Window | t: Transpose | s: Axis | [/]: Slice | T: Theme | q: Quit";

/// Draw the whole viewer.
pub fn draw(f: &mut Frame<'_>, state: &ViewerState, layout: &LayoutConfig) {
    let colors = state.theme.colors();
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(colors.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(layout.header_height),
            Constraint::Min(4),
            Constraint::Length(layout.footer_height),
        ])
        .split(area);

    match &state.variable {
        Some(var) => {
            draw_header(f, chunks[0], var, &colors);
            match state.projected() {
                Some(Ok(Projected::Grid(grid))) => {
                    draw_heatmap(f, chunks[1], &grid, &state.scale, layout, &colors)
                },
                Some(Ok(Projected::Line(values))) => {
                    draw_line(f, chunks[1], &values, var, layout, &colors)
                },
                Some(Err(e)) => draw_message(f, chunks[1], &e.to_string(), colors.error),
                None => draw_message(f, chunks[1], "No projection", colors.text),
            }
        },
        None => {
            let title = state.file_path.display().to_string();
            draw_message(f, chunks[0], &title, colors.heading);
            draw_message(f, chunks[1], &state.status, colors.text);
        },
    }

    draw_footer(f, chunks[2], state, &colors);
}

fn draw_header(f: &mut Frame<'_>, area: Rect, var: &LoadedVariable, colors: &ThemeColors) {
    let mut title = vec![Span::styled(
        var.path.clone(),
        Style::default().fg(colors.heading).add_modifier(Modifier::BOLD),
    )];
    if let Some(units) = &var.units {
        title.push(Span::styled(format!(" [{}]", units), Style::default().fg(colors.value)));
    }

    let dims: Vec<String> = var
        .dim_names
        .iter()
        .zip(var.shape.iter())
        .map(|(name, size)| format!("{}:{}", name, size))
        .collect();
    let range = match var.min_max {
        Some((min, max)) => format!("{} .. {}", format_value(min), format_value(max)),
        None => "no valid values".to_string(),
    };
    let info = Line::from(vec![
        Span::styled("Shape: ", Style::default().fg(colors.label)),
        Span::styled(
            format!("{} [{}]", format_shape(&var.shape), dims.join(", ")),
            Style::default().fg(colors.text),
        ),
        Span::styled("  Range: ", Style::default().fg(colors.label)),
        Span::styled(range, Style::default().fg(colors.value)),
        Span::styled(
            format!(
                "  ({} valid of {})",
                format_number(var.valid_count),
                format_number(var.total_elements())
            ),
            Style::default().fg(colors.text),
        ),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(title), info])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors.border)),
        );
    f.render_widget(paragraph, area);
}

fn draw_message(f: &mut Frame<'_>, area: Rect, text: &str, fg: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(fg))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Pick at most `max_rows` × `max_cols` cells of `grid` with a uniform stride.
pub fn stride_sample(grid: &Array2<f64>, max_rows: usize, max_cols: usize) -> Array2<f64> {
    let (rows, cols) = grid.dim();
    if rows == 0 || cols == 0 || max_rows == 0 || max_cols == 0 {
        return Array2::zeros((0, 0));
    }
    let out_rows = rows.min(max_rows);
    let out_cols = cols.min(max_cols);
    let row_step = rows as f64 / out_rows as f64;
    let col_step = cols as f64 / out_cols as f64;
    Array2::from_shape_fn((out_rows, out_cols), |(r, c)| {
        let src_r = ((r as f64 * row_step).floor() as usize).min(rows - 1);
        let src_c = ((c as f64 * col_step).floor() as usize).min(cols - 1);
        grid[[src_r, src_c]]
    })
}

/// Chart points for `values`, thinned to at most `max_points`. Non-finite
/// values are skipped.
pub fn line_points(values: &Array1<f64>, max_points: usize) -> Vec<(f64, f64)> {
    let n = values.len();
    if n == 0 || max_points == 0 {
        return Vec::new();
    }
    let step = (n as f64 / max_points as f64).max(1.0);
    let mut points = Vec::with_capacity(n.min(max_points));
    let mut pos = 0.0;
    while (pos as usize) < n {
        let i = pos as usize;
        if values[i].is_finite() {
            points.push((i as f64, values[i]));
        }
        pos += step;
    }
    points
}

fn draw_heatmap(
    f: &mut Frame<'_>,
    area: Rect,
    grid: &Array2<f64>,
    scale: &ColorScale,
    layout: &LayoutConfig,
    colors: &ThemeColors,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let margin = layout.heatmap.left_margin;
    let bar_height = layout.heatmap.colorbar_height;
    if inner.width <= margin || inner.height <= bar_height + 1 {
        return;
    }

    draw_colorbar(f, inner, scale, layout, colors);

    let map_area = Rect {
        x: inner.x + margin,
        y: inner.y + bar_height,
        width: inner.width - margin,
        height: inner.height - bar_height,
    };
    // Each character cell holds two grid rows.
    let sampled = stride_sample(grid, map_area.height as usize * 2, map_area.width as usize);
    let (rows, cols) = sampled.dim();
    if rows == 0 {
        return;
    }

    let buf = f.buffer_mut();
    for y in 0..(rows + 1) / 2 {
        for x in 0..cols {
            let top = Color::from(scale.color(sampled[[2 * y, x]]));
            let bottom = match sampled.get([2 * y + 1, x]) {
                Some(&v) => Color::from(scale.color(v)),
                None => colors.bg,
            };
            if let Some(cell) = buf.cell_mut((map_area.x + x as u16, map_area.y + y as u16)) {
                cell.set_char('▀').set_fg(top).set_bg(bottom);
            }
        }
    }

    let (grid_rows, _) = grid.dim();
    let labels = [
        (0, "0".to_string()),
        ((rows + 1) / 2 - 1, grid_rows.saturating_sub(1).to_string()),
    ];
    for (y, label) in labels {
        let short: String = label.chars().take(margin.saturating_sub(1) as usize).collect();
        let start = map_area.x.saturating_sub(short.len() as u16 + 1);
        for (i, ch) in short.chars().enumerate() {
            if let Some(cell) = buf.cell_mut((start + i as u16, map_area.y + y as u16)) {
                cell.set_char(ch).set_fg(colors.label);
            }
        }
    }
}

fn draw_colorbar(
    f: &mut Frame<'_>,
    inner: Rect,
    scale: &ColorScale,
    layout: &LayoutConfig,
    colors: &ThemeColors,
) {
    let min_label = format_value(scale.min);
    let max_label = format_value(scale.max);
    let reserved = min_label.len() + max_label.len() + 2;
    let width = layout
        .heatmap
        .colorbar_width
        .min((inner.width as usize).saturating_sub(reserved));
    if width == 0 {
        return;
    }
    let start = inner.x + ((inner.width as usize - width) / 2) as u16;

    let buf = f.buffer_mut();
    for i in 0..width {
        let stop = if scale.is_degenerate() {
            MIDPOINT
        } else {
            i * VIRIDIS.len() / width
        };
        if let Some(cell) = buf.cell_mut((start + i as u16, inner.y)) {
            cell.set_char('█').set_fg(Color::from(VIRIDIS[stop]));
        }
    }

    let min_x = start.saturating_sub(min_label.len() as u16 + 1);
    for (i, ch) in min_label.chars().enumerate() {
        if let Some(cell) = buf.cell_mut((min_x + i as u16, inner.y)) {
            cell.set_char(ch).set_fg(colors.label);
        }
    }
    let max_x = start + width as u16 + 1;
    for (i, ch) in max_label.chars().enumerate() {
        let x = max_x + i as u16;
        if x < inner.x + inner.width {
            if let Some(cell) = buf.cell_mut((x, inner.y)) {
                cell.set_char(ch).set_fg(colors.label);
            }
        }
    }
}

/// Format axis label with smart precision.
fn format_axis_label(val: f64) -> String {
    if !val.is_finite() {
        return "?".to_string();
    }
    let abs_val = val.abs();
    if abs_val == 0.0 {
        "0".to_string()
    } else if !(1e-2..1e5).contains(&abs_val) {
        format!("{:.1e}", val)
    } else if abs_val >= 100.0 {
        format!("{:.0}", val)
    } else if abs_val >= 1.0 {
        format!("{:.1}", val)
    } else {
        format!("{:.2}", val)
    }
}

fn draw_line(
    f: &mut Frame<'_>,
    area: Rect,
    values: &Array1<f64>,
    var: &LoadedVariable,
    layout: &LayoutConfig,
    colors: &ThemeColors,
) {
    let max_points = (area.width as usize).saturating_sub(layout.plot.label_columns).max(1);
    let series = line_points(values, max_points);
    if series.is_empty() {
        draw_message(f, area, "No valid data to display", colors.text);
        return;
    }

    let (y_lo, y_hi) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let padding = match (y_hi - y_lo).abs() * layout.plot.y_axis_padding_factor {
        p if p > 0.0 => p,
        _ => 1.0,
    };
    let (y_min, y_max) = (y_lo - padding, y_hi + padding);
    let x_max = (values.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![Dataset::default()
        .name(var.name.as_str())
        .marker(ratatui::symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(colors.line))
        .data(&series)];

    let x_axis = Axis::default()
        .title("index")
        .style(Style::default().fg(colors.text))
        .bounds([0.0, x_max])
        .labels(vec![
            format_axis_label(0.0),
            format_axis_label(x_max / 2.0),
            format_axis_label(x_max),
        ]);
    let y_title = match &var.units {
        Some(u) if !u.is_empty() => format!("[{}]", u),
        _ => "Value".to_string(),
    };
    let y_axis = Axis::default()
        .title(y_title)
        .style(Style::default().fg(colors.text))
        .bounds([y_min, y_max])
        .labels(vec![
            format_axis_label(y_min),
            format_axis_label((y_min + y_max) / 2.0),
            format_axis_label(y_max),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);
    f.render_widget(chart, area);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, state: &ViewerState, colors: &ThemeColors) {
    let summary = state
        .projection
        .as_ref()
        .map(|p| format!("[{}] {}", p.mode().name(), p.describe()))
        .unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled(summary, Style::default().fg(colors.value))),
        Line::from(Span::styled(
            state.status.clone(),
            Style::default().fg(colors.status_fg).bg(colors.status_bg),
        )),
        Line::from(Span::styled(KEY_HELP, Style::default().fg(colors.label))),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::backend::RawVariable;
    use crate::data::Attributes;
    use crate::ui::Theme;
    use ndarray::{array, ArrayD, IxDyn};
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    #[test]
    fn stride_sample_keeps_small_grids() {
        let grid = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(stride_sample(&grid, 10, 10), grid);
    }

    #[test]
    fn stride_sample_picks_uniformly() {
        let grid = Array2::from_shape_fn((8, 6), |(r, c)| (r * 10 + c) as f64);
        let sampled = stride_sample(&grid, 4, 3);
        assert_eq!(sampled.dim(), (4, 3));
        assert_eq!(sampled[[0, 0]], 0.0);
        assert_eq!(sampled[[1, 1]], 22.0);
        assert_eq!(sampled[[3, 2]], 64.0);
    }

    #[test]
    fn stride_sample_of_empty_grid_is_empty() {
        assert_eq!(stride_sample(&Array2::zeros((0, 3)), 4, 4).len(), 0);
        assert_eq!(stride_sample(&array![[1.0]], 0, 4).len(), 0);
    }

    #[test]
    fn line_points_skip_missing_values() {
        let values = array![1.0, f64::NAN, 3.0];
        assert_eq!(line_points(&values, 10), vec![(0.0, 1.0), (2.0, 3.0)]);
    }

    #[test]
    fn line_points_thin_long_series() {
        let values = Array1::from_iter((0..100).map(f64::from));
        let points = line_points(&values, 10);
        assert_eq!(points.len(), 10);
        assert_eq!(points[1], (10.0, 10.0));
    }

    #[test]
    fn renders_heatmap_and_footer() {
        let raw = RawVariable {
            data: ArrayD::from_shape_vec(IxDyn(&[4, 6]), (0..24).map(f64::from).collect()).unwrap(),
            dim_names: vec!["lat".into(), "lon".into()],
            dtype: "float64".into(),
            attributes: Attributes::new(),
            encoding: Default::default(),
        };
        let mut state = ViewerState::new(PathBuf::from("t.nc"), None, Theme::default());
        state.set_variable(LoadedVariable::from_raw("t", "/t", raw));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &state, &LayoutConfig::default()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains('▀'));
        assert!(text.contains("Plot: lat × lon"));
        assert!(text.contains("/t"));
    }

    #[test]
    fn renders_variable_without_records() {
        let raw = RawVariable {
            data: ArrayD::zeros(IxDyn(&[0, 3, 4])),
            dim_names: vec!["time".into(), "lat".into(), "lon".into()],
            dtype: "float32".into(),
            attributes: Attributes::new(),
            encoding: Default::default(),
        };
        let mut state = ViewerState::new(PathBuf::from("t.nc"), None, Theme::default());
        state.set_variable(LoadedVariable::from_raw("t", "/t", raw));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &state, &LayoutConfig::default()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Plot: lat × lon | Slice: time=0"));
        assert!(!text.contains('▀'));
    }

    #[test]
    fn renders_status_before_load() {
        let state = ViewerState::new(PathBuf::from("t.nc"), None, Theme::GruvboxLight);
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|f| draw(f, &state, &LayoutConfig::default()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Scanning"));
    }
}
