//! Helpers shared by the netCDF engines.

use super::{parse_first_number, Encoding, NodeDetails, RawVariable, MAX_GROUP_DEPTH};
use crate::data::{path_segments, Attributes, Node, NodeKind, NodeMetadata};
use crate::error::{GyreError, Result};
use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use std::path::Path;
use tracing::{debug, warn};

/// A container of dimensions, variables and groups: the file itself or one
/// of its groups.
pub(super) enum Scope<'a> {
    File(&'a netcdf::File),
    Group(netcdf::Group<'a>),
}

impl Scope<'_> {
    fn attributes(&self) -> Attributes {
        match self {
            Scope::File(f) => collect_attributes(f.attributes()),
            Scope::Group(g) => collect_attributes(g.attributes()),
        }
    }

    fn dimensions(&self) -> Vec<netcdf::Dimension<'_>> {
        match self {
            Scope::File(f) => f.dimensions().collect(),
            Scope::Group(g) => g.dimensions().collect(),
        }
    }

    fn variables(&self) -> Vec<netcdf::Variable<'_>> {
        match self {
            Scope::File(f) => f.variables().collect(),
            Scope::Group(g) => g.variables().collect(),
        }
    }

    /// Child groups. Classic files have none.
    pub(super) fn groups(&self) -> Vec<netcdf::Group<'_>> {
        match self {
            Scope::File(f) => f.groups().map(Iterator::collect).unwrap_or_default(),
            Scope::Group(g) => g.groups().collect(),
        }
    }

    fn group(&self, name: &str) -> Option<netcdf::Group<'_>> {
        match self {
            Scope::File(f) => f.group(name).ok().flatten(),
            Scope::Group(g) => g.group(name),
        }
    }

    fn variable(&self, name: &str) -> Option<netcdf::Variable<'_>> {
        match self {
            Scope::File(f) => f.variable(name),
            Scope::Group(g) => g.variable(name),
        }
    }

    fn dimension(&self, name: &str) -> Option<netcdf::Dimension<'_>> {
        match self {
            Scope::File(f) => f.dimension(name),
            Scope::Group(g) => g.dimension(name),
        }
    }
}

/// An object found by walking a node path.
pub(super) enum Found<'s, 'a> {
    Scope(&'s Scope<'a>),
    Variable(netcdf::Variable<'s>),
    Dimension(netcdf::Dimension<'s>),
}

/// Open a file for one call.
pub(super) fn open(path: &Path) -> Result<netcdf::File> {
    Ok(netcdf::open(path)?)
}

/// Name shown for the root node of `path`.
pub(super) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Walk `node_path` from `scope`, trying group, then variable, then dimension
/// at the last segment, and hand the hit to `f`.
pub(super) fn locate<T>(
    scope: &Scope<'_>,
    node_path: &str,
    f: impl FnOnce(Found<'_, '_>) -> Result<T>,
) -> Result<T> {
    let segments: Vec<&str> = path_segments(node_path).collect();
    descend(scope, &segments, node_path, f)
}

fn descend<T>(
    scope: &Scope<'_>,
    segments: &[&str],
    node_path: &str,
    f: impl FnOnce(Found<'_, '_>) -> Result<T>,
) -> Result<T> {
    let Some((first, rest)) = segments.split_first() else {
        return f(Found::Scope(scope));
    };

    if !rest.is_empty() {
        let group = scope
            .group(first)
            .ok_or_else(|| GyreError::path_not_found(node_path))?;
        return descend(&Scope::Group(group), rest, node_path, f);
    }

    if let Some(group) = scope.group(first) {
        return f(Found::Scope(&Scope::Group(group)));
    }
    if let Some(var) = scope.variable(first) {
        return f(Found::Variable(var));
    }
    if let Some(dim) = scope.dimension(first) {
        return f(Found::Dimension(dim));
    }
    Err(GyreError::path_not_found(node_path))
}

/// Attributes and metadata of a located object.
pub(super) fn details(found: Found<'_, '_>) -> NodeDetails {
    match found {
        Found::Scope(scope) => NodeDetails {
            attributes: scope.attributes(),
            metadata: None,
        },
        Found::Variable(var) => NodeDetails {
            attributes: collect_attributes(var.attributes()),
            metadata: Some(variable_metadata(&var)),
        },
        Found::Dimension(dim) => NodeDetails {
            attributes: Attributes::new(),
            metadata: Some(NodeMetadata::dimension(dim.len(), dim.is_unlimited())),
        },
    }
}

/// Values of a located object, which must be a variable.
pub(super) fn raw_values(found: Found<'_, '_>, node_path: &str) -> Result<RawVariable> {
    let Found::Variable(var) = found else {
        return Err(GyreError::no_data(node_path));
    };

    let vartype = var.vartype();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let attributes = collect_attributes(var.attributes());
    let encoding = variable_encoding(&var, &vartype);

    debug!("Reading {} {:?} from {}", dtype_name(&vartype), shape, node_path);
    let data = read_array(&var, &vartype, &shape)?;

    Ok(RawVariable {
        data,
        dim_names,
        dtype: dtype_name(&vartype),
        attributes,
        encoding,
    })
}

/// CF encoding read from the typed attribute values, so fills compare
/// exactly against the widened data.
fn variable_encoding(var: &netcdf::Variable<'_>, vartype: &NcVariableType) -> Encoding {
    let encoding = Encoding::from_lookup(
        |key| {
            var.attribute(key)
                .and_then(|attr| attr.value().ok())
                .and_then(|value| first_number(&value))
        },
        default_fill(vartype),
    );
    match vartype {
        NcVariableType::Float(FloatType::F32) => encoding.narrowed_to_f32(),
        _ => encoding,
    }
}

/// A numeric attribute, or the first element of a numeric list, as f64.
fn first_number(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Uchar(v) => Some(f64::from(*v)),
        AttributeValue::Schar(v) => Some(f64::from(*v)),
        AttributeValue::Ushort(v) => Some(f64::from(*v)),
        AttributeValue::Short(v) => Some(f64::from(*v)),
        AttributeValue::Uint(v) => Some(f64::from(*v)),
        AttributeValue::Int(v) => Some(f64::from(*v)),
        AttributeValue::Ulonglong(v) => Some(*v as f64),
        AttributeValue::Longlong(v) => Some(*v as f64),
        AttributeValue::Float(v) => Some(f64::from(*v)),
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Uchars(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Schars(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Ushorts(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Shorts(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Uints(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Ints(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Ulonglongs(v) => v.first().map(|&x| x as f64),
        AttributeValue::Longlongs(v) => v.first().map(|&x| x as f64),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Str(v) => parse_first_number(v),
        AttributeValue::Strs(v) => v.first().and_then(|s| parse_first_number(s)),
    }
}

/// Add dimensions, variables and (when `recurse` is set) groups of `scope`
/// under `node`, in that order.
pub(super) fn scan_scope(scope: &Scope<'_>, node: &mut Node, recurse: bool, depth: usize) {
    for dim in scope.dimensions() {
        node.add_child(
            Node::new(dim.name(), NodeKind::Dimension, &node.path)
                .with_metadata(NodeMetadata::dimension(dim.len(), dim.is_unlimited())),
        );
    }

    for var in scope.variables() {
        node.add_child(
            Node::new(var.name(), NodeKind::Variable, &node.path)
                .with_metadata(variable_metadata(&var)),
        );
    }

    if !recurse {
        return;
    }

    for group in scope.groups() {
        let mut child = Node::new(group.name(), NodeKind::Group, &node.path);
        if depth + 1 >= MAX_GROUP_DEPTH {
            warn!(
                "Group nesting deeper than {} at {}; not descending",
                MAX_GROUP_DEPTH, child.path
            );
        } else {
            scan_scope(&Scope::Group(group), &mut child, true, depth + 1);
        }
        node.add_child(child);
    }
}

fn variable_metadata(var: &netcdf::Variable<'_>) -> NodeMetadata {
    let shape = var.dimensions().iter().map(|d| d.len()).collect();
    let dims = var.dimensions().iter().map(|d| d.name()).collect();
    NodeMetadata::variable(dtype_name(&var.vartype()), shape, dims)
}

fn collect_attributes<'a>(attrs: impl Iterator<Item = netcdf::Attribute<'a>>) -> Attributes {
    attrs
        .map(|attr| (attr.name().to_string(), attr_value_to_string(&attr)))
        .collect()
}

fn attr_value_to_string(attr: &netcdf::Attribute<'_>) -> String {
    match attr.value() {
        Ok(AttributeValue::Uchar(v)) => format!("{}", v),
        Ok(AttributeValue::Schar(v)) => format!("{}", v),
        Ok(AttributeValue::Ushort(v)) => format!("{}", v),
        Ok(AttributeValue::Short(v)) => format!("{}", v),
        Ok(AttributeValue::Uint(v)) => format!("{}", v),
        Ok(AttributeValue::Int(v)) => format!("{}", v),
        Ok(AttributeValue::Ulonglong(v)) => format!("{}", v),
        Ok(AttributeValue::Longlong(v)) => format!("{}", v),
        Ok(AttributeValue::Float(v)) => format!("{}", v),
        Ok(AttributeValue::Double(v)) => format!("{}", v),
        Ok(AttributeValue::Str(v)) => v,
        Ok(AttributeValue::Uchars(v)) => format!("{:?}", v),
        Ok(AttributeValue::Schars(v)) => format!("{:?}", v),
        Ok(AttributeValue::Ushorts(v)) => format!("{:?}", v),
        Ok(AttributeValue::Shorts(v)) => format!("{:?}", v),
        Ok(AttributeValue::Uints(v)) => format!("{:?}", v),
        Ok(AttributeValue::Ints(v)) => format!("{:?}", v),
        Ok(AttributeValue::Ulonglongs(v)) => format!("{:?}", v),
        Ok(AttributeValue::Longlongs(v)) => format!("{:?}", v),
        Ok(AttributeValue::Floats(v)) => format!("{:?}", v),
        Ok(AttributeValue::Doubles(v)) => format!("{:?}", v),
        Ok(AttributeValue::Strs(v)) => v.join(", "),
        Err(e) => format!("<unreadable: {}>", e),
    }
}

/// Numpy-style element type name.
pub(super) fn dtype_name(vartype: &NcVariableType) -> String {
    let name = match vartype {
        NcVariableType::Int(IntType::I8) => "int8",
        NcVariableType::Int(IntType::U8) => "uint8",
        NcVariableType::Int(IntType::I16) => "int16",
        NcVariableType::Int(IntType::U16) => "uint16",
        NcVariableType::Int(IntType::I32) => "int32",
        NcVariableType::Int(IntType::U32) => "uint32",
        NcVariableType::Int(IntType::I64) => "int64",
        NcVariableType::Int(IntType::U64) => "uint64",
        NcVariableType::Float(FloatType::F32) => "float32",
        NcVariableType::Float(FloatType::F64) => "float64",
        NcVariableType::Char => "char",
        NcVariableType::String => "str",
        other => return format!("{:?}", other).to_lowercase(),
    };
    name.to_string()
}

/// The library's default fill for a type. Byte types have none.
pub(super) fn default_fill(vartype: &NcVariableType) -> Option<f64> {
    match vartype {
        NcVariableType::Int(IntType::I16) => Some(-32767.0),
        NcVariableType::Int(IntType::U16) => Some(65535.0),
        NcVariableType::Int(IntType::I32) => Some(-2147483647.0),
        NcVariableType::Int(IntType::U32) => Some(4294967295.0),
        NcVariableType::Int(IntType::I64) => Some(-9223372036854775806.0),
        NcVariableType::Int(IntType::U64) => Some(18446744073709551614.0),
        NcVariableType::Float(FloatType::F32) => Some(f64::from(9.96921e36_f32)),
        NcVariableType::Float(FloatType::F64) => Some(9.969209968386869e36),
        _ => None,
    }
}

fn read_array(
    var: &netcdf::Variable<'_>,
    vartype: &NcVariableType,
    shape: &[usize],
) -> Result<ArrayD<f64>> {
    macro_rules! read_as {
        ($t:ty) => {{
            let values: Vec<$t> = var.get_values(..)?;
            values.into_iter().map(|x| x as f64).collect::<Vec<f64>>()
        }};
    }

    let values = match vartype {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..)?,
        NcVariableType::Float(FloatType::F32) => read_as!(f32),
        NcVariableType::Int(IntType::I64) => read_as!(i64),
        NcVariableType::Int(IntType::I32) => read_as!(i32),
        NcVariableType::Int(IntType::I16) => read_as!(i16),
        NcVariableType::Int(IntType::I8) => read_as!(i8),
        NcVariableType::Int(IntType::U64) => read_as!(u64),
        NcVariableType::Int(IntType::U32) => read_as!(u32),
        NcVariableType::Int(IntType::U16) => read_as!(u16),
        NcVariableType::Int(IntType::U8) => read_as!(u8),
        NcVariableType::Char | NcVariableType::String => {
            return Err(GyreError::backend("Character/string data cannot be visualized"));
        },
        other => {
            return Err(GyreError::backend(format!("Unsupported variable type: {:?}", other)));
        },
    };

    Ok(ArrayD::from_shape_vec(IxDyn(shape), values)?)
}
