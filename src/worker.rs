//! Background thread for structure scans and value loads.
//!
//! The UI thread never blocks on file access. Every request gets a generation
//! number and every result carries it back, so the caller can tell stale
//! results apart from current ones.

use crate::data::{DataReader, DatasetInfo, LoadedVariable};
use crate::error::{GyreError, Result};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Request sent to the worker thread.
enum Request {
    Scan {
        generation: u64,
        path: PathBuf,
    },
    Load {
        generation: u64,
        file_path: PathBuf,
        name: String,
        path: String,
    },
    Shutdown,
}

/// Result sent back by the worker thread.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A structure scan finished.
    Scanned {
        /// Generation of the request.
        generation: u64,
        /// Scanned dataset or the surfaced error.
        result: Result<DatasetInfo>,
    },
    /// A value load finished.
    Loaded {
        /// Generation of the request.
        generation: u64,
        /// Variable path.
        path: String,
        /// Loaded values, `None` when no backend could read them.
        variable: Option<LoadedVariable>,
    },
}

/// Decides whether a scan result may replace the current tree.
///
/// A result is admitted only when no newer scan has been applied yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanGate {
    applied: u64,
}

impl ScanGate {
    /// Admit `generation`, recording it as applied.
    pub fn admit(&mut self, generation: u64) -> bool {
        if generation > self.applied {
            self.applied = generation;
            true
        } else {
            false
        }
    }

    /// Generation of the last admitted scan.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

/// Owns the background thread.
#[derive(Debug)]
pub struct Worker {
    request_tx: Sender<Request>,
    event_rx: Receiver<WorkerEvent>,
    thread_handle: Option<JoinHandle<()>>,
    next_generation: u64,
}

impl Worker {
    /// Spawn the worker thread with its own reader.
    pub fn spawn(reader: DataReader) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();

        let thread_handle = thread::Builder::new()
            .name("gyre-worker".to_string())
            .spawn(move || {
                debug!("Worker thread started");
                Self::thread_loop(&reader, request_rx, event_tx);
                debug!("Worker thread exiting");
            })?;

        Ok(Self {
            request_tx,
            event_rx,
            thread_handle: Some(thread_handle),
            next_generation: 0,
        })
    }

    fn thread_loop(
        reader: &DataReader,
        request_rx: Receiver<Request>,
        event_tx: Sender<WorkerEvent>,
    ) {
        while let Ok(request) = request_rx.recv() {
            let event = match request {
                Request::Scan { generation, path } => {
                    info!("Scanning {} (generation {})", path.display(), generation);
                    WorkerEvent::Scanned {
                        generation,
                        result: reader.scan_structure(&path),
                    }
                },
                Request::Load {
                    generation,
                    file_path,
                    name,
                    path,
                } => WorkerEvent::Loaded {
                    generation,
                    variable: reader.load_values_at(&file_path, &name, &path),
                    path,
                },
                Request::Shutdown => break,
            };
            if event_tx.send(event).is_err() {
                warn!("Event channel closed, worker exiting");
                break;
            }
        }
    }

    fn submit(&mut self, make: impl FnOnce(u64) -> Request) -> Result<u64> {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.request_tx
            .send(make(generation))
            .map_err(|_| GyreError::backend("worker thread is gone"))?;
        Ok(generation)
    }

    /// Queue a structure scan of `path`.
    pub fn scan(&mut self, path: PathBuf) -> Result<u64> {
        self.submit(|generation| Request::Scan { generation, path })
    }

    /// Queue a value load of the variable at `path`.
    pub fn load(&mut self, file_path: PathBuf, name: String, path: String) -> Result<u64> {
        self.submit(|generation| Request::Load {
            generation,
            file_path,
            name,
            path,
        })
    }

    /// Next finished result, if any.
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.request_tx.send(Request::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}
