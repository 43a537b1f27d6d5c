//! Projection viewer - state management.
//!
//! The viewer owns the scanned dataset, the loaded variable and its
//! projection. Events from the background worker are applied here; rendering
//! lives in [`ui`].

pub mod ui;

use crate::data::{DatasetInfo, LoadedVariable};
use crate::error::Result;
use crate::projection::{Projected, ProjectionState};
use crate::ui::Theme;
use crate::util::colormaps::ColorScale;
use crate::worker::{ScanGate, WorkerEvent};
use crossterm::event::KeyCode;
use std::path::PathBuf;
use tracing::debug;

/// A variable the viewer wants loaded next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// File holding the variable.
    pub file_path: PathBuf,
    /// Variable name.
    pub name: String,
    /// Variable path.
    pub path: String,
}

/// State of the projection viewer.
#[derive(Debug)]
pub struct ViewerState {
    /// File being viewed.
    pub file_path: PathBuf,
    /// Variable path asked for on the command line.
    pub requested_path: Option<String>,
    /// Scanned dataset.
    pub dataset: Option<DatasetInfo>,
    /// Loaded variable.
    pub variable: Option<LoadedVariable>,
    /// Projection of the loaded variable.
    pub projection: Option<ProjectionState>,
    /// Color scale over the global range of the variable.
    pub scale: ColorScale,
    /// Active theme.
    pub theme: Theme,
    /// Status message.
    pub status: String,
    /// Set when the user asked to quit.
    pub should_quit: bool,
    scan_gate: ScanGate,
    pending_load: Option<u64>,
}

impl ViewerState {
    /// Create a viewer for `file_path`.
    pub fn new(file_path: PathBuf, requested_path: Option<String>, theme: Theme) -> Self {
        Self {
            status: format!("Scanning {}...", file_path.display()),
            file_path,
            requested_path,
            dataset: None,
            variable: None,
            projection: None,
            scale: ColorScale::from_range(None),
            theme,
            should_quit: false,
            scan_gate: ScanGate::default(),
            pending_load: None,
        }
    }

    /// Remember the generation of the load that is in flight.
    pub fn set_pending_load(&mut self, generation: u64) {
        self.pending_load = Some(generation);
    }

    /// Apply a worker result. Returns the variable to load next, if any.
    pub fn apply_event(&mut self, event: WorkerEvent) -> Option<LoadRequest> {
        match event {
            WorkerEvent::Scanned { generation, result } => {
                if !self.scan_gate.admit(generation) {
                    debug!("Dropping stale scan {}", generation);
                    return None;
                }
                match result {
                    Ok(dataset) => self.apply_dataset(dataset),
                    Err(e) => {
                        // Keep whatever was displayed before.
                        self.status = format!("Failed to open file: {}", e);
                        None
                    },
                }
            },
            WorkerEvent::Loaded {
                generation,
                path,
                variable,
            } => {
                if self.pending_load != Some(generation) {
                    debug!("Dropping stale load of {}", path);
                    return None;
                }
                self.pending_load = None;
                match variable {
                    Some(var) => self.set_variable(var),
                    None => self.status = format!("No data available for {}", path),
                }
                None
            },
        }
    }

    fn apply_dataset(&mut self, dataset: DatasetInfo) -> Option<LoadRequest> {
        let target = match &self.requested_path {
            Some(path) => match dataset.find(path) {
                Some(node) if node.is_variable() => Some(node),
                Some(_) => {
                    self.status = format!("{} is not a variable", path);
                    None
                },
                None => {
                    self.status = format!("Path not found: {}", path);
                    None
                },
            },
            None => {
                let first = dataset.first_variable();
                if first.is_none() {
                    self.status = "File has no variables".to_string();
                }
                first
            },
        };

        let request = target.map(|node| LoadRequest {
            file_path: dataset.file_path.clone(),
            name: node.name.clone(),
            path: node.path.clone(),
        });
        if let Some(req) = &request {
            self.status = format!("Loading {}...", req.path);
        }
        self.dataset = Some(dataset);
        request
    }

    /// Show `var`, resetting the projection and the color scale.
    pub fn set_variable(&mut self, var: LoadedVariable) {
        self.projection = Some(ProjectionState::new(&var.shape, &var.dim_names));
        self.scale = ColorScale::from_range(var.min_max);
        self.status = format!("Loaded {}", var.path);
        self.variable = Some(var);
    }

    /// Current projection of the loaded variable.
    pub fn projected(&self) -> Option<Result<Projected>> {
        let var = self.variable.as_ref()?;
        let projection = self.projection.as_ref()?;
        Some(projection.project(&var.data))
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            },
            KeyCode::Char('T') => {
                self.theme = self.theme.next();
                self.status = format!("Theme: {}", self.theme.name());
                return;
            },
            _ => {},
        }

        let Some(projection) = self.projection.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char('m') => {
                projection.toggle_mode();
                self.status = format!("Mode: {}", projection.mode().name());
            },
            KeyCode::Char('h') | KeyCode::Left => projection.shift_window(-1),
            KeyCode::Char('l') | KeyCode::Right => projection.shift_window(1),
            KeyCode::Char('+') | KeyCode::Char('=') => projection.grow_window(),
            KeyCode::Char('-') => projection.shrink_window(),
            KeyCode::Char('t') => projection.transpose(),
            KeyCode::Char('s') => {
                projection.cycle_active_axis();
                if let Some(axis) = projection.active_axis() {
                    self.status = format!("Selected dimension {} for slicing", axis);
                }
            },
            KeyCode::Char(']') | KeyCode::PageUp => projection.step_active_slice(1),
            KeyCode::Char('[') | KeyCode::PageDown => projection.step_active_slice(-1),
            _ => {},
        }
    }
}
