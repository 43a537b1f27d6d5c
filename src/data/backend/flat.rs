//! Root-level netCDF engine.

use super::nc::{self, Scope};
use super::{Backend, NodeDetails, RawVariable};
use crate::data::{DatasetInfo, Node};
use crate::error::{GyreError, Result};
use std::path::Path;

/// Reads files whose content lives entirely in the root group.
///
/// A file with sub-groups is refused so that the grouped engine, next in the
/// chain, gets to build the full tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBackend;

impl FlatBackend {
    fn open_flat(path: &Path) -> Result<netcdf::File> {
        let file = nc::open(path)?;
        if !Scope::File(&file).groups().is_empty() {
            return Err(GyreError::backend("file has groups; flat reader handles the root only"));
        }
        Ok(file)
    }
}

impl Backend for FlatBackend {
    fn tag(&self) -> &'static str {
        "netcdf-flat"
    }

    fn scan_structure(&self, path: &Path) -> Result<DatasetInfo> {
        let file = Self::open_flat(path)?;
        let mut root = Node::root(nc::file_label(path));
        nc::scan_scope(&Scope::File(&file), &mut root, false, 0);
        Ok(DatasetInfo::new(path.to_path_buf(), self.tag(), root))
    }

    fn load_attributes(&self, path: &Path, node_path: &str) -> Result<NodeDetails> {
        let file = Self::open_flat(path)?;
        nc::locate(&Scope::File(&file), node_path, |found| Ok(nc::details(found)))
    }

    fn load_values(&self, path: &Path, node_path: &str) -> Result<RawVariable> {
        let file = Self::open_flat(path)?;
        nc::locate(&Scope::File(&file), node_path, |found| nc::raw_values(found, node_path))
    }
}
