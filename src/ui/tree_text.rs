//! Plain-text rendering of the data tree and node details.

use super::formatters::{format_number, format_shape};
use crate::data::{DatasetInfo, LoadState, Node, NodeKind};
use std::fmt::Write as _;

/// Render the browsing tree (groups and variables) with a count summary.
pub fn format_tree(dataset: &DatasetInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", dataset.root.display_name());

    // (node, prefix of its children, is last sibling)
    let mut stack: Vec<(&Node, String, bool)> = Vec::new();
    push_children(&mut stack, &dataset.root, "");

    while let Some((node, prefix, last)) = stack.pop() {
        let branch = if last { "└── " } else { "├── " };
        let _ = writeln!(out, "{}{}{}", prefix, branch, node.display_name());
        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        push_children(&mut stack, node, &child_prefix);
    }

    let counts = dataset.count_nodes();
    let _ = writeln!(
        out,
        "\n{} groups, {} variables, {} dimensions ({} via {})",
        counts.groups,
        counts.variables,
        counts.dimensions,
        dataset.file_path.display(),
        dataset.backend_tag
    );
    out
}

fn push_children<'a>(stack: &mut Vec<(&'a Node, String, bool)>, node: &'a Node, prefix: &str) {
    let visible: Vec<&Node> = node.children.iter().filter(|c| c.is_tree_visible()).collect();
    let n = visible.len();
    for (i, child) in visible.into_iter().enumerate().rev() {
        stack.push((child, prefix.to_string(), i + 1 == n));
    }
}

/// Render everything known about one node.
pub fn format_details(node: &Node) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", node.display_name());
    let _ = writeln!(out, "{}", "─".repeat(50));
    let _ = writeln!(out, "Type: {}", node.kind.name());
    let _ = writeln!(out, "Path: {}", node.path);

    let meta = &node.metadata;
    match node.kind {
        NodeKind::Variable => {
            if let Some(shape) = &meta.shape {
                let _ = writeln!(out, "Shape: {}", format_shape(shape));
            }
            if !meta.dims.is_empty() {
                let _ = writeln!(out, "Dimensions: {}", meta.dims.join(", "));
            }
            if let Some(dtype) = &meta.dtype {
                let _ = writeln!(out, "Data type: {}", dtype);
            }
            if let Some(size) = meta.size {
                let _ = writeln!(out, "Size: {} elements", format_number(size));
            }
        },
        NodeKind::Dimension => {
            if let Some(size) = meta.size {
                let _ = writeln!(out, "Length: {}", format_number(size));
            }
            if meta.unlimited == Some(true) {
                let _ = writeln!(out, "Unlimited: yes");
            }
        },
        NodeKind::Root | NodeKind::Group => {
            let _ = writeln!(out, "Children: {}", node.children.len());
        },
        NodeKind::Attribute => {},
    }

    match node.load_state {
        LoadState::NotLoaded => {
            let _ = writeln!(out, "\nAttributes: (not loaded)");
        },
        LoadState::LoadFailed => {
            let _ = writeln!(out, "\nAttributes: (failed to load)");
        },
        LoadState::Loaded if node.attributes.is_empty() => {
            let _ = writeln!(out, "\nAttributes: none");
        },
        LoadState::Loaded => {
            let _ = writeln!(out, "\nAttributes:");
            for (key, value) in &node.attributes {
                let _ = writeln!(out, "  {}: {}", key, value);
            }
        },
    }
    out
}
