//! Data node types and structures.

use std::collections::BTreeMap;

/// Attribute map of a node, ordered by key.
pub type Attributes = BTreeMap<String, String>;

/// Type of node in the file hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root node (file level).
    Root,
    /// Group node.
    Group,
    /// Variable node.
    Variable,
    /// Dimension node.
    Dimension,
    /// Attribute node.
    Attribute,
}

impl NodeKind {
    /// Lowercase name used in listings.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Group => "group",
            NodeKind::Variable => "variable",
            NodeKind::Dimension => "dimension",
            NodeKind::Attribute => "attribute",
        }
    }

    /// Precedence when siblings share a path: groups, then variables, then
    /// dimensions.
    fn lookup_rank(self) -> u8 {
        match self {
            NodeKind::Root | NodeKind::Group => 0,
            NodeKind::Variable => 1,
            NodeKind::Dimension => 2,
            NodeKind::Attribute => 3,
        }
    }
}

/// Attribute resolution state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Attributes have not been read yet.
    #[default]
    NotLoaded,
    /// Attributes were read successfully.
    Loaded,
    /// Every backend failed; never retried.
    LoadFailed,
}

/// Structural facts about a node, filled in by the structure scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMetadata {
    /// Element type (numpy-style name such as `float32`).
    pub dtype: Option<String>,
    /// Extent of each axis.
    pub shape: Option<Vec<usize>>,
    /// Dimension name of each axis.
    pub dims: Vec<String>,
    /// Total element count.
    pub size: Option<usize>,
    /// Whether a dimension is unlimited.
    pub unlimited: Option<bool>,
}

impl NodeMetadata {
    /// Metadata of an array variable.
    pub fn variable(dtype: impl Into<String>, shape: Vec<usize>, dims: Vec<String>) -> Self {
        let size = shape.iter().product();
        Self {
            dtype: Some(dtype.into()),
            shape: Some(shape),
            dims,
            size: Some(size),
            unlimited: None,
        }
    }

    /// Metadata of a dimension.
    pub fn dimension(len: usize, unlimited: bool) -> Self {
        Self {
            dtype: None,
            shape: Some(vec![len]),
            dims: Vec::new(),
            size: Some(len),
            unlimited: Some(unlimited),
        }
    }

    /// Number of axes, if known.
    pub fn ndim(&self) -> Option<usize> {
        self.shape.as_ref().map(Vec::len)
    }

    /// Fill in facts that are still missing. Existing values are kept.
    pub fn augment(&mut self, other: NodeMetadata) {
        if self.dtype.is_none() {
            self.dtype = other.dtype;
        }
        if self.shape.is_none() {
            self.shape = other.shape;
        }
        if self.dims.is_empty() {
            self.dims = other.dims;
        }
        if self.size.is_none() {
            self.size = other.size;
        }
        if self.unlimited.is_none() {
            self.unlimited = other.unlimited;
        }
    }
}

/// Build the path of a child node.
///
/// Groups end in `/`, every other kind is `<parent><name>`. Backends re-locate
/// objects by walking these strings, so this is the single place where paths
/// are made.
pub fn child_path(parent_path: &str, name: &str, kind: NodeKind) -> String {
    let sep = if parent_path.ends_with('/') { "" } else { "/" };
    match kind {
        NodeKind::Group => format!("{}{}{}/", parent_path, sep, name),
        _ => format!("{}{}{}", parent_path, sep, name),
    }
}

/// Split a node path into its non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A node in the data tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name.
    pub name: String,
    /// Type of node.
    pub kind: NodeKind,
    /// Full path to this node.
    pub path: String,
    /// Path of the parent node (identifier only, not ownership).
    pub parent: Option<String>,
    /// Child nodes in file order.
    pub children: Vec<Node>,
    /// Attributes, empty until resolved.
    pub attributes: Attributes,
    /// Structural metadata.
    pub metadata: NodeMetadata,
    /// Attribute resolution state.
    pub load_state: LoadState,
}

impl Node {
    /// Create the root node of a file.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Root,
            path: "/".to_string(),
            parent: None,
            children: Vec::new(),
            attributes: Attributes::new(),
            metadata: NodeMetadata::default(),
            load_state: LoadState::NotLoaded,
        }
    }

    /// Create a node below `parent_path`.
    pub fn new(name: impl Into<String>, kind: NodeKind, parent_path: &str) -> Self {
        let name = name.into();
        let path = child_path(parent_path, &name, kind);
        // Dimensions have no attributes to resolve.
        let load_state = match kind {
            NodeKind::Dimension => LoadState::Loaded,
            _ => LoadState::NotLoaded,
        };
        Self {
            name,
            kind,
            path,
            parent: Some(parent_path.to_string()),
            children: Vec::new(),
            attributes: Attributes::new(),
            metadata: NodeMetadata::default(),
            load_state,
        }
    }

    /// Attach structural metadata.
    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check if this node is a variable.
    pub fn is_variable(&self) -> bool {
        self.kind == NodeKind::Variable
    }

    /// Check if this node is a group (or root).
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group | NodeKind::Root)
    }

    /// Whether the browsing tree shows this node. Dimensions and attributes
    /// are listed in the details view instead.
    pub fn is_tree_visible(&self) -> bool {
        !matches!(self.kind, NodeKind::Dimension | NodeKind::Attribute)
    }

    /// Add a child node.
    pub fn add_child(&mut self, mut child: Node) {
        child.parent = Some(self.path.clone());
        self.children.push(child);
    }

    /// Shape of the node, empty when unknown.
    pub fn shape(&self) -> &[usize] {
        self.metadata.shape.as_deref().unwrap_or(&[])
    }

    /// Find a node by path. A coordinate variable wins over the dimension
    /// it shares a path with.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let mut current = self;
        loop {
            if current.path == path {
                return Some(current);
            }
            current = &current.children[current.next_towards(path)?];
        }
    }

    /// Find a node by path, mutably.
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut current = self;
        loop {
            if current.path == path {
                return Some(current);
            }
            let next = current.next_towards(path)?;
            current = &mut current.children[next];
        }
    }

    fn next_towards(&self, path: &str) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.leads_to(path))
            .min_by_key(|(_, c)| c.kind.lookup_rank())
            .map(|(i, _)| i)
    }

    fn leads_to(&self, path: &str) -> bool {
        self.path == path || (self.is_group() && path.starts_with(&self.path))
    }

    /// All nodes of the subtree in pre-order.
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Get display name with icon and metadata.
    pub fn display_name(&self) -> String {
        let icon = match self.kind {
            NodeKind::Root => "🏠",
            NodeKind::Group => "📂",
            NodeKind::Variable => "🌡️",
            NodeKind::Dimension => "📏",
            NodeKind::Attribute => "🏷️",
        };

        let suffix = match self.kind {
            NodeKind::Variable => {
                // Format: name (dim1=size1, dim2=size2) [ND] type
                let mut parts = Vec::new();
                let shape = self.shape();

                if !self.metadata.dims.is_empty() && self.metadata.dims.len() == shape.len() {
                    let dims: Vec<String> = self
                        .metadata
                        .dims
                        .iter()
                        .zip(shape)
                        .map(|(d, s)| format!("{}={}", d, s))
                        .collect();
                    parts.push(format!("({})", dims.join(", ")));
                } else if !shape.is_empty() {
                    let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
                    parts.push(format!("({})", dims.join("×")));
                }

                if let Some(label) = self.dimensionality_label() {
                    parts.push(format!("[{}]", label));
                }

                if let Some(dtype) = &self.metadata.dtype {
                    parts.push(dtype.clone());
                }

                if parts.is_empty() {
                    String::new()
                } else {
                    format!(" {}", parts.join(" "))
                }
            },
            NodeKind::Group | NodeKind::Root => {
                let count = self.children.iter().filter(|c| c.is_tree_visible()).count();
                format!(" ({})", count)
            },
            NodeKind::Dimension => match self.metadata.size {
                Some(size) if self.metadata.unlimited == Some(true) => {
                    format!(" ({}, unlimited)", size)
                },
                Some(size) => format!(" ({})", size),
                None => String::new(),
            },
            NodeKind::Attribute => String::new(),
        };

        format!("{} {}{}", icon, self.name, suffix)
    }

    /// Dimensionality label such as `3D` or `Geo2D`.
    fn dimensionality_label(&self) -> Option<String> {
        let ndim = self.metadata.ndim()?;
        if ndim == 0 {
            return Some("scalar".to_string());
        }
        let geo = (ndim == 2 || ndim == 3) && is_geographic(&self.metadata.dims);
        Some(format!("{}{}D", if geo { "Geo" } else { "" }, ndim))
    }

    /// Check if this node matches a search query.
    pub fn matches_search(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&query_lower);

        if hit(&self.name) || hit(&self.path) {
            return true;
        }

        if self.attributes.iter().any(|(k, v)| hit(k) || hit(v)) {
            return true;
        }

        self.metadata.dtype.as_deref().is_some_and(hit) || self.metadata.dims.iter().any(|d| hit(d))
    }
}

fn is_geographic(dims: &[String]) -> bool {
    const GEO_TERMS: [&str; 14] = [
        "lat", "lon", "latitude", "longitude", "x", "y", "row", "col", "rows", "cols",
        "northing", "easting", "across", "along",
    ];
    let joined = dims.join(" ").to_lowercase();
    GEO_TERMS.iter().any(|term| joined.contains(term))
}
