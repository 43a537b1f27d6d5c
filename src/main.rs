//! Gyre - explore and view netCDF/HDF5 files from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gyre::data::DataReader;
use gyre::ui::{tree_text, Theme};
use gyre::util::layout_config::LayoutConfig;
use gyre::viewer::{self, LoadRequest, ViewerState};
use gyre::worker::Worker;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "gyre")]
#[command(
    about = "Lazy explorer and N-dimensional slice viewer for netCDF/HDF5 files",
    long_about = None
)]
struct Cli {
    /// Enable logging to specified file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Color theme of the viewer
    #[arg(long, global = true, value_enum, default_value_t = Theme::GruvboxDark)]
    theme: Theme,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the structure of a file
    Tree {
        /// File to scan
        file: PathBuf,
    },
    /// Print the metadata and attributes of one node
    Info {
        /// File to scan
        file: PathBuf,
        /// Node path, e.g. `/ocean/temp`
        path: String,
    },
    /// Open the interactive slice viewer
    View {
        /// File to open
        file: PathBuf,
        /// Variable to show; defaults to the first variable in the file
        variable: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_path) = &cli.log {
        init_logging(log_path)?;
        tracing::info!("Starting Gyre");
    }

    let result = match cli.command {
        Command::Tree { file } => print_tree(&file),
        Command::Info { file, path } => print_info(&file, &path),
        Command::View { file, variable } => view(file, variable, cli.theme),
    };

    if cli.log.is_some() {
        tracing::info!("Gyre exited");
    }
    result
}

fn init_logging(log_path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env("GYRE_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_tree(file: &Path) -> Result<()> {
    let dataset = DataReader::new().scan_structure(file)?;
    println!("{}", tree_text::format_tree(&dataset));
    Ok(())
}

fn print_info(file: &Path, path: &str) -> Result<()> {
    let reader = DataReader::new();
    let mut dataset = reader.scan_structure(file)?;
    reader.resolve_path(&mut dataset, path)?;
    let node = dataset
        .find(path)
        .ok_or_else(|| gyre::GyreError::path_not_found(path))?;
    println!("{}", tree_text::format_details(node));
    Ok(())
}

fn view(file: PathBuf, variable: Option<String>, theme: Theme) -> Result<()> {
    // Fail before touching the terminal when the file cannot be opened at all.
    if !file.exists() {
        return Err(gyre::GyreError::file_not_found(&file).into());
    }
    if !DataReader::can_read(&file) {
        let extension = file
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(gyre::GyreError::unsupported_format(extension).into());
    }

    let mut worker = Worker::spawn(DataReader::new()).context("Failed to start worker thread")?;
    worker.scan(file.clone())?;
    let state = ViewerState::new(file, variable, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, state, &mut worker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut state: ViewerState,
    worker: &mut Worker,
) -> Result<()> {
    let layout = LayoutConfig::default();

    loop {
        while let Some(event) = worker.try_recv() {
            if let Some(LoadRequest { file_path, name, path }) = state.apply_event(event) {
                let generation = worker.load(file_path, name, path)?;
                state.set_pending_load(generation);
            }
        }

        terminal.draw(|f| viewer::ui::draw(f, &state, &layout))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    state.handle_key(key.code);
                }
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}
