//! Data reading and representation.
//!
//! This module reads hierarchical array files through a chain of backends and
//! represents their structure as a tree of nodes. Structure is scanned once;
//! attributes and values are read on demand.

pub mod backend;
mod dataset;
mod node;
mod reader;
mod values;

pub use dataset::{DatasetInfo, NodeCounts};
pub use node::{child_path, path_segments, Attributes, LoadState, Node, NodeKind, NodeMetadata};
pub use reader::{DataReader, SUPPORTED_EXTENSIONS};
pub use values::{global_range, sanitize, LoadedVariable};
