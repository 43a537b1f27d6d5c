//! Hierarchical netCDF-4 engine.

use super::nc::{self, Scope};
use super::{Backend, NodeDetails, RawVariable};
use crate::data::{DatasetInfo, Node};
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Reads netCDF files including nested groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedBackend;

impl Backend for GroupedBackend {
    fn tag(&self) -> &'static str {
        "netcdf-grouped"
    }

    fn scan_structure(&self, path: &Path) -> Result<DatasetInfo> {
        let file = nc::open(path)?;
        let mut root = Node::root(nc::file_label(path));
        nc::scan_scope(&Scope::File(&file), &mut root, true, 0);
        debug!("Scanned {} top-level nodes in {}", root.children.len(), path.display());
        Ok(DatasetInfo::new(path.to_path_buf(), self.tag(), root))
    }

    fn load_attributes(&self, path: &Path, node_path: &str) -> Result<NodeDetails> {
        let file = nc::open(path)?;
        nc::locate(&Scope::File(&file), node_path, |found| Ok(nc::details(found)))
    }

    fn load_values(&self, path: &Path, node_path: &str) -> Result<RawVariable> {
        let file = nc::open(path)?;
        nc::locate(&Scope::File(&file), node_path, |found| nc::raw_values(found, node_path))
    }
}
