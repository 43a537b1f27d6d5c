//! File reader with backend fallback.

use super::backend::{default_backends, Backend};
use super::{DatasetInfo, LoadState, LoadedVariable, Node, NodeMetadata};
use crate::error::{GyreError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Extensions accepted by [`DataReader::can_read`], lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["nc", "nc4", "netcdf", "cdf", "hdf5", "h5", "he5"];

/// Data reader driving an ordered list of backends.
#[derive(Debug)]
pub struct DataReader {
    backends: Vec<Box<dyn Backend>>,
}

impl Default for DataReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataReader {
    /// Reader with the default engine order.
    pub fn new() -> Self {
        Self::with_backends(default_backends())
    }

    /// Reader with a custom engine order.
    pub fn with_backends(backends: Vec<Box<dyn Backend>>) -> Self {
        Self { backends }
    }

    /// Whether the extension of `path` is in the allow-list.
    pub fn can_read(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }

    /// Build the node tree of a file without reading any attributes.
    pub fn scan_structure(&self, path: &Path) -> Result<DatasetInfo> {
        if !path.exists() {
            return Err(GyreError::file_not_found(path));
        }
        if !Self::can_read(path) {
            let ext = path.extension().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            return Err(GyreError::unsupported_format(ext));
        }

        let mut last_error = String::from("no backend available");
        for backend in &self.backends {
            match backend.scan_structure(path) {
                Ok(dataset) if !dataset.is_empty() => {
                    info!(
                        "Scanned {} with {} ({} variables)",
                        path.display(),
                        backend.tag(),
                        dataset.variable_names.len()
                    );
                    return Ok(dataset);
                },
                Ok(_) => {
                    debug!("{} found nothing in {}", backend.tag(), path.display());
                    last_error = format!("{} found no content", backend.tag());
                },
                Err(e) => {
                    debug!("{} could not scan {}: {}", backend.tag(), path.display(), e);
                    last_error = e.to_string();
                },
            }
        }

        Err(GyreError::backend_read_failure(path, last_error))
    }

    /// Fill in the attributes of `node` if they have not been read yet.
    ///
    /// The first backend that locates the node wins. When every backend
    /// fails the node is marked [`LoadState::LoadFailed`] and never retried.
    pub fn resolve_details(&self, file_path: &Path, node: &mut Node) {
        if node.load_state != LoadState::NotLoaded {
            return;
        }

        for backend in &self.backends {
            match backend.load_attributes(file_path, &node.path) {
                Ok(details) => {
                    node.attributes = details.attributes;
                    if let Some(metadata) = details.metadata {
                        node.metadata.augment(metadata);
                    }
                    node.load_state = LoadState::Loaded;
                    return;
                },
                Err(e) => debug!("{} could not resolve {}: {}", backend.tag(), node.path, e),
            }
        }

        node.attributes.clear();
        node.load_state = LoadState::LoadFailed;
    }

    /// Resolve the node at `path` inside `dataset`. Resolving the root also
    /// fills the global attributes.
    pub fn resolve_path(&self, dataset: &mut DatasetInfo, path: &str) -> Result<()> {
        let file_path = dataset.file_path.clone();
        let node = dataset
            .find_mut(path)
            .ok_or_else(|| GyreError::path_not_found(path))?;
        self.resolve_details(&file_path, node);

        if node.path == "/" {
            let globals = node.attributes.clone();
            dataset.global_attributes = globals;
        }
        Ok(())
    }

    /// Walk `path` inside the file and return what the first backend able to
    /// find it reports about the object.
    pub fn locate(&self, file_path: &Path, path: &str) -> Result<NodeMetadata> {
        let mut last_error = GyreError::path_not_found(path);
        for backend in &self.backends {
            match backend.load_attributes(file_path, path) {
                Ok(details) => return Ok(details.metadata.unwrap_or_default()),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }

    /// Load the values of a variable node. Returns `None` for other kinds of
    /// node or when no backend can read it.
    pub fn load_values(&self, dataset: &DatasetInfo, node: &Node) -> Option<LoadedVariable> {
        if !node.is_variable() {
            return None;
        }
        self.load_values_at(&dataset.file_path, &node.name, &node.path)
    }

    /// Load the values of the variable at `path` without a scanned tree.
    pub fn load_values_at(
        &self,
        file_path: &Path,
        name: &str,
        path: &str,
    ) -> Option<LoadedVariable> {
        for backend in &self.backends {
            match backend.load_values(file_path, path) {
                Ok(raw) => return Some(LoadedVariable::from_raw(name, path, raw)),
                Err(e) => debug!("{} could not load {}: {}", backend.tag(), path, e),
            }
        }
        debug!("No backend could load {} from {}", path, file_path.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::backend::{NodeDetails, RawVariable};
    use crate::data::{Attributes, NodeKind};
    use ndarray::{ArrayD, IxDyn};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted backend counting its calls.
    #[derive(Debug)]
    struct Scripted {
        tag: &'static str,
        works: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(tag: &'static str, works: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let backend = Self {
                tag,
                works,
                calls: Arc::clone(&calls),
            };
            (backend, calls)
        }

        fn check(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.works {
                Ok(())
            } else {
                Err(GyreError::backend(format!("{} refuses", self.tag)))
            }
        }
    }

    impl Backend for Scripted {
        fn tag(&self) -> &'static str {
            self.tag
        }

        fn scan_structure(&self, path: &Path) -> Result<DatasetInfo> {
            self.check()?;
            let mut root = Node::root("mock.nc");
            root.add_child(Node::new("v", NodeKind::Variable, "/"));
            Ok(DatasetInfo::new(path.to_path_buf(), self.tag, root))
        }

        fn load_attributes(&self, _path: &Path, node_path: &str) -> Result<NodeDetails> {
            self.check()?;
            let mut attributes = Attributes::new();
            attributes.insert("source".into(), format!("{}:{}", self.tag, node_path));
            Ok(NodeDetails {
                attributes,
                metadata: Some(NodeMetadata::variable("float64", vec![2], vec!["x".into()])),
            })
        }

        fn load_values(&self, _path: &Path, _node_path: &str) -> Result<RawVariable> {
            self.check()?;
            Ok(RawVariable {
                data: ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0, 3.0])?,
                dim_names: vec!["x".into()],
                dtype: "float64".into(),
                attributes: Attributes::new(),
                encoding: Default::default(),
            })
        }
    }

    fn existing_file(ext: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("mock.{}", ext));
        std::fs::write(&path, b"not really netcdf").unwrap();
        (dir, path)
    }

    #[test]
    fn can_read_follows_allow_list() {
        for ok in ["a.nc", "a.NC4", "a.netcdf", "a.cdf", "a.hdf5", "a.H5", "a.he5"] {
            assert!(DataReader::can_read(Path::new(ok)), "{}", ok);
        }
        for bad in ["a.txt", "a", "nc", "a.nc.bak", "a.zarr"] {
            assert!(!DataReader::can_read(Path::new(bad)), "{}", bad);
        }
    }

    #[test]
    fn missing_and_unsupported_files_are_rejected() {
        let reader = DataReader::new();
        let err = reader.scan_structure(Path::new("/no/such/file.nc")).unwrap_err();
        assert!(matches!(err, GyreError::FileNotFound { .. }));

        let (_dir, path) = existing_file("txt");
        let err = reader.scan_structure(&path).unwrap_err();
        assert!(matches!(
            err,
            GyreError::UnsupportedFormat { ref extension } if extension == "txt"
        ));
    }

    #[test]
    fn second_backend_wins_when_first_fails() {
        let (first, first_calls) = Scripted::new("first", false);
        let (second, second_calls) = Scripted::new("second", true);
        let reader = DataReader::with_backends(vec![Box::new(first), Box::new(second)]);
        let (_dir, path) = existing_file("nc");

        let dataset = reader.scan_structure(&path).unwrap();
        assert_eq!(dataset.backend_tag, "second");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exhausted_chain_reports_last_message() {
        let (first, _) = Scripted::new("first", false);
        let (second, _) = Scripted::new("second", false);
        let reader = DataReader::with_backends(vec![Box::new(first), Box::new(second)]);
        let (_dir, path) = existing_file("h5");

        match reader.scan_structure(&path) {
            Err(GyreError::BackendReadFailure { message, .. }) => {
                assert!(message.contains("second refuses"))
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn resolve_reads_at_most_once() {
        let (backend, calls) = Scripted::new("only", true);
        let reader = DataReader::with_backends(vec![Box::new(backend)]);
        let mut node = Node::new("v", NodeKind::Variable, "/");

        reader.resolve_details(Path::new("mock.nc"), &mut node);
        let first = node.attributes.clone();
        reader.resolve_details(Path::new("mock.nc"), &mut node);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(node.attributes, first);
        assert_eq!(node.load_state, LoadState::Loaded);
        assert_eq!(node.metadata.dtype.as_deref(), Some("float64"));
    }

    #[test]
    fn resolve_failure_is_terminal() {
        let (backend, calls) = Scripted::new("broken", false);
        let reader = DataReader::with_backends(vec![Box::new(backend)]);
        let mut node = Node::new("v", NodeKind::Variable, "/");

        reader.resolve_details(Path::new("mock.nc"), &mut node);
        reader.resolve_details(Path::new("mock.nc"), &mut node);

        assert_eq!(node.load_state, LoadState::LoadFailed);
        assert!(node.attributes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resolving_root_fills_global_attributes() {
        let (backend, _) = Scripted::new("only", true);
        let reader = DataReader::with_backends(vec![Box::new(backend)]);
        let (_dir, path) = existing_file("nc");
        let mut dataset = reader.scan_structure(&path).unwrap();

        reader.resolve_path(&mut dataset, "/").unwrap();
        assert_eq!(
            dataset.global_attributes.get("source").map(String::as_str),
            Some("only:/")
        );
        assert!(matches!(
            reader.resolve_path(&mut dataset, "/nope"),
            Err(GyreError::PathNotFound { .. })
        ));
    }

    #[test]
    fn loader_degrades_to_none() {
        let (broken, _) = Scripted::new("broken", false);
        let reader = DataReader::with_backends(vec![Box::new(broken)]);
        let (_dir, path) = existing_file("nc");
        let dataset = DatasetInfo::new(path, "mock", Node::root("mock.nc"));
        let var = Node::new("v", NodeKind::Variable, "/");
        assert!(reader.load_values(&dataset, &var).is_none());

        let (working, _) = Scripted::new("ok", true);
        let reader = DataReader::with_backends(vec![Box::new(working)]);
        let loaded = reader.load_values(&dataset, &var).unwrap();
        assert_eq!(loaded.min_max, Some((1.0, 3.0)));

        let group = Node::new("g", NodeKind::Group, "/");
        assert!(reader.load_values(&dataset, &group).is_none());
    }
}
