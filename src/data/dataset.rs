//! Dataset information.

use super::{Attributes, Node, NodeKind};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Node counts by kind, as shown in summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCounts {
    /// Number of groups (root excluded).
    pub groups: usize,
    /// Number of variables.
    pub variables: usize,
    /// Number of dimensions.
    pub dimensions: usize,
    /// Every node including the root.
    pub total: usize,
}

/// Information about a scanned dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Path to the source file.
    pub file_path: PathBuf,
    /// Name of the backend variant that produced the tree.
    pub backend_tag: &'static str,
    /// Root node of the data tree.
    pub root: Node,
    /// Dimension extents keyed by group-relative name.
    pub dimension_sizes: BTreeMap<String, usize>,
    /// Global attributes, filled once the root is resolved.
    pub global_attributes: Attributes,
    /// Group-relative names of every variable.
    pub variable_names: Vec<String>,
}

impl DatasetInfo {
    /// Create a dataset info, indexing dimensions and variables of the tree.
    pub fn new(file_path: PathBuf, backend_tag: &'static str, root: Node) -> Self {
        let mut dimension_sizes = BTreeMap::new();
        let mut variable_names = Vec::new();

        for node in root.walk() {
            let key = node.path.trim_start_matches('/').to_string();
            match node.kind {
                NodeKind::Dimension => {
                    let size = node.metadata.size.unwrap_or(0);
                    dimension_sizes.insert(key, size);
                },
                NodeKind::Variable => variable_names.push(key),
                _ => {},
            }
        }

        Self {
            file_path,
            backend_tag,
            root,
            dimension_sizes,
            global_attributes: Attributes::new(),
            variable_names,
        }
    }

    /// Whether the scan found anything at all.
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
            && self.variable_names.is_empty()
            && self.dimension_sizes.is_empty()
    }

    /// Find a node by path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.root.find(path)
    }

    /// Find a node by path, mutably.
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Node> {
        self.root.find_mut(path)
    }

    /// Paths of all ancestors of `path`, root first. Used to expand a tree
    /// view down to a node.
    pub fn ancestors(&self, path: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut parent = self.find(path).and_then(|n| n.parent.clone());
        while let Some(p) = parent {
            parent = self.find(&p).and_then(|n| n.parent.clone());
            chain.push(p);
        }
        chain.reverse();
        chain
    }

    /// First variable in tree order.
    pub fn first_variable(&self) -> Option<&Node> {
        self.root.walk().into_iter().find(|n| n.is_variable())
    }

    /// Paths of the nodes matching `query`, in tree order.
    pub fn search(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return Vec::new();
        }
        self.root
            .walk()
            .into_iter()
            .filter(|n| n.matches_search(query))
            .map(|n| n.path.clone())
            .collect()
    }

    /// Count nodes by kind.
    pub fn count_nodes(&self) -> NodeCounts {
        let mut counts = NodeCounts::default();
        for node in self.root.walk() {
            counts.total += 1;
            match node.kind {
                NodeKind::Group => counts.groups += 1,
                NodeKind::Variable => counts.variables += 1,
                NodeKind::Dimension => counts.dimensions += 1,
                NodeKind::Root | NodeKind::Attribute => {},
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NodeMetadata;

    fn dataset() -> DatasetInfo {
        let mut root = Node::root("a.nc");
        root.add_child(
            Node::new("x", NodeKind::Dimension, "/")
                .with_metadata(NodeMetadata::dimension(5, false)),
        );
        let mut grp = Node::new("grp", NodeKind::Group, "/");
        grp.add_child(
            Node::new("depth", NodeKind::Dimension, "/grp/")
                .with_metadata(NodeMetadata::dimension(3, false)),
        );
        grp.add_child(Node::new("v", NodeKind::Variable, "/grp/"));
        root.add_child(grp);
        root.add_child(Node::new("u", NodeKind::Variable, "/"));
        DatasetInfo::new(PathBuf::from("a.nc"), "test", root)
    }

    #[test]
    fn indexes_dimensions_and_variables() {
        let ds = dataset();
        assert_eq!(ds.dimension_sizes.get("x"), Some(&5));
        assert_eq!(ds.dimension_sizes.get("grp/depth"), Some(&3));
        assert_eq!(ds.variable_names, vec!["grp/v".to_string(), "u".to_string()]);
        assert!(!ds.is_empty());
    }

    #[test]
    fn ancestors_run_from_root() {
        let ds = dataset();
        assert_eq!(ds.ancestors("/grp/v"), vec!["/".to_string(), "/grp/".to_string()]);
        assert!(ds.ancestors("/").is_empty());
    }

    #[test]
    fn counts_and_search() {
        let ds = dataset();
        let counts = ds.count_nodes();
        assert_eq!(counts.groups, 1);
        assert_eq!(counts.variables, 2);
        assert_eq!(counts.dimensions, 2);
        assert_eq!(counts.total, 6);

        assert_eq!(ds.search("grp"), vec!["/grp/", "/grp/depth", "/grp/v"]);
        assert!(ds.search("").is_empty());
        assert_eq!(ds.first_variable().map(|n| n.path.as_str()), Some("/grp/v"));
    }

    #[test]
    fn empty_scan_is_detected() {
        let ds = DatasetInfo::new(PathBuf::from("e.nc"), "test", Node::root("e.nc"));
        assert!(ds.is_empty());
    }
}
