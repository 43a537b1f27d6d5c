//! Generic HDF5 engine, the last fallback.
//!
//! Plain HDF5 has no named dimensions, so axes are labelled `dim_0`, `dim_1`,
//! and so on, and no dimension nodes are produced.

use super::{nc, Backend, Encoding, NodeDetails, RawVariable, MAX_GROUP_DEPTH};
use crate::data::{path_segments, Attributes, DatasetInfo, Node, NodeKind, NodeMetadata};
use crate::error::{GyreError, Result};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use std::path::Path;
use tracing::warn;

/// Reads any HDF5 file through the HDF5 library directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Backend;

enum Object {
    Group(hdf5::Group),
    Dataset(hdf5::Dataset),
}

impl Hdf5Backend {
    fn locate(file: &hdf5::File, node_path: &str) -> Result<Object> {
        let segments: Vec<&str> = path_segments(node_path).collect();
        if segments.is_empty() {
            return Ok(Object::Group(file.as_group()?));
        }
        let inner = segments.join("/");
        if let Ok(group) = file.group(&inner) {
            return Ok(Object::Group(group));
        }
        file.dataset(&inner)
            .map(Object::Dataset)
            .map_err(|_| GyreError::path_not_found(node_path))
    }

    fn scan_group(group: &hdf5::Group, node: &mut Node, depth: usize) -> Result<()> {
        for name in group.member_names()? {
            if let Ok(child_group) = group.group(&name) {
                let mut child = Node::new(&name, NodeKind::Group, &node.path);
                if depth + 1 >= MAX_GROUP_DEPTH {
                    warn!(
                        "Group nesting deeper than {} at {}; not descending",
                        MAX_GROUP_DEPTH, child.path
                    );
                } else {
                    Self::scan_group(&child_group, &mut child, depth + 1)?;
                }
                node.add_child(child);
            } else if let Ok(dataset) = group.dataset(&name) {
                node.add_child(
                    Node::new(&name, NodeKind::Variable, &node.path)
                        .with_metadata(dataset_metadata(&dataset)),
                );
            }
        }
        Ok(())
    }
}

impl Backend for Hdf5Backend {
    fn tag(&self) -> &'static str {
        "hdf5"
    }

    fn scan_structure(&self, path: &Path) -> Result<DatasetInfo> {
        let file = hdf5::File::open(path)?;
        let mut root = Node::root(nc::file_label(path));
        Self::scan_group(&file, &mut root, 0)?;
        Ok(DatasetInfo::new(path.to_path_buf(), self.tag(), root))
    }

    fn load_attributes(&self, path: &Path, node_path: &str) -> Result<NodeDetails> {
        let file = hdf5::File::open(path)?;
        let details = match Self::locate(&file, node_path)? {
            Object::Group(group) => NodeDetails {
                attributes: read_attributes(&group)?,
                metadata: None,
            },
            Object::Dataset(dataset) => NodeDetails {
                attributes: read_attributes(&dataset)?,
                metadata: Some(dataset_metadata(&dataset)),
            },
        };
        Ok(details)
    }

    fn load_values(&self, path: &Path, node_path: &str) -> Result<RawVariable> {
        let file = hdf5::File::open(path)?;
        let Object::Dataset(dataset) = Self::locate(&file, node_path)? else {
            return Err(GyreError::no_data(node_path));
        };

        let attributes = read_attributes(&dataset)?;
        let dim_names = (0..dataset.ndim()).map(|i| format!("dim_{}", i)).collect();
        let dtype = dtype_name(&dataset);
        let mut encoding = Encoding::from_attributes(&attributes, None);
        if dtype == "float32" {
            encoding = encoding.narrowed_to_f32();
        }
        Ok(RawVariable {
            data: dataset.read_dyn::<f64>()?,
            dim_names,
            dtype,
            encoding,
            attributes,
        })
    }
}

fn dataset_metadata(dataset: &hdf5::Dataset) -> NodeMetadata {
    let shape = dataset.shape();
    let dims = (0..shape.len()).map(|i| format!("dim_{}", i)).collect();
    NodeMetadata::variable(dtype_name(dataset), shape, dims)
}

fn dtype_name(dataset: &hdf5::Dataset) -> String {
    let Ok(descriptor) = dataset.dtype().and_then(|t| t.to_descriptor()) else {
        return "unknown".to_string();
    };
    let name = match descriptor {
        TypeDescriptor::Integer(IntSize::U1) => "int8",
        TypeDescriptor::Integer(IntSize::U2) => "int16",
        TypeDescriptor::Integer(IntSize::U4) => "int32",
        TypeDescriptor::Integer(IntSize::U8) => "int64",
        TypeDescriptor::Unsigned(IntSize::U1) => "uint8",
        TypeDescriptor::Unsigned(IntSize::U2) => "uint16",
        TypeDescriptor::Unsigned(IntSize::U4) => "uint32",
        TypeDescriptor::Unsigned(IntSize::U8) => "uint64",
        TypeDescriptor::Float(FloatSize::U4) => "float32",
        TypeDescriptor::Float(FloatSize::U8) => "float64",
        TypeDescriptor::Boolean => "bool",
        TypeDescriptor::VarLenUnicode | TypeDescriptor::VarLenAscii => "str",
        other => return format!("{:?}", other).to_lowercase(),
    };
    name.to_string()
}

fn read_attributes(location: &hdf5::Location) -> Result<Attributes> {
    let mut attributes = Attributes::new();
    for name in location.attr_names()? {
        let attr = location.attr(&name)?;
        let value = if let Ok(s) = attr.read_scalar::<VarLenUnicode>() {
            s.as_str().to_string()
        } else if let Ok(s) = attr.read_scalar::<VarLenAscii>() {
            s.as_str().to_string()
        } else if let Ok(values) = attr.read_raw::<f64>() {
            match values.as_slice() {
                [single] => format!("{}", single),
                many => format!("{:?}", many),
            }
        } else {
            "<unreadable>".to_string()
        };
        attributes.insert(name, value);
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LoadedVariable;
    use ndarray::{arr0, array};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn text(value: &str) -> VarLenUnicode {
        value.parse().unwrap()
    }

    /// `/ocean/deep/temp` is a 2x2 f32 dataset whose `[0, 1]` cell holds the
    /// `_FillValue` of 1e20.
    fn nested_file(dir: &Path) -> PathBuf {
        let path = dir.join("nested.h5");
        let file = hdf5::File::create(&path).unwrap();
        file.new_attr_builder()
            .with_data(&arr0(text("hdf5 fixture")))
            .create("title")
            .unwrap();

        let deep = file.create_group("ocean").unwrap().create_group("deep").unwrap();
        let temp = deep
            .new_dataset_builder()
            .with_data(&array![[1.0f32, 1e20], [3.0, 4.0]])
            .create("temp")
            .unwrap();
        temp.new_attr_builder().with_data(&arr0(text("K"))).create("units").unwrap();
        temp.new_attr_builder().with_data(&arr0(1e20f32)).create("_FillValue").unwrap();
        path
    }

    #[test]
    fn nested_groups_are_scanned() {
        let dir = tempdir().unwrap();
        let path = nested_file(dir.path());

        let dataset = Hdf5Backend.scan_structure(&path).unwrap();
        assert_eq!(dataset.backend_tag, "hdf5");
        assert!(dataset.find("/ocean/deep/").unwrap().is_group());
        let temp = dataset.find("/ocean/deep/temp").unwrap();
        assert_eq!(temp.kind, NodeKind::Variable);
        assert_eq!(temp.shape(), &[2, 2]);
        assert_eq!(temp.metadata.dims, vec!["dim_0", "dim_1"]);
        assert_eq!(temp.metadata.dtype.as_deref(), Some("float32"));
    }

    #[test]
    fn attributes_are_located_by_path() {
        let dir = tempdir().unwrap();
        let path = nested_file(dir.path());

        let root = Hdf5Backend.load_attributes(&path, "/").unwrap();
        assert_eq!(root.attributes.get("title").map(String::as_str), Some("hdf5 fixture"));
        assert!(root.metadata.is_none());

        let temp = Hdf5Backend.load_attributes(&path, "/ocean/deep/temp").unwrap();
        assert_eq!(temp.attributes.get("units").map(String::as_str), Some("K"));
        assert_eq!(temp.metadata.and_then(|m| m.shape), Some(vec![2, 2]));

        let err = Hdf5Backend.load_attributes(&path, "/ocean/nope").unwrap_err();
        assert!(matches!(err, GyreError::PathNotFound { .. }));
    }

    #[test]
    fn values_are_read_and_masked() {
        let dir = tempdir().unwrap();
        let path = nested_file(dir.path());

        let raw = Hdf5Backend.load_values(&path, "/ocean/deep/temp").unwrap();
        assert_eq!(raw.dtype, "float32");
        assert_eq!(raw.encoding.fill_values, vec![f64::from(1e20_f32)]);

        let var = LoadedVariable::from_raw("temp", "/ocean/deep/temp", raw);
        assert!(var.data[[0, 1]].is_nan());
        assert_eq!(var.valid_count, 3);
        assert_eq!(var.min_max, Some((1.0, 4.0)));

        let err = Hdf5Backend.load_values(&path, "/ocean/").unwrap_err();
        assert!(matches!(err, GyreError::NoData { .. }));
    }
}
