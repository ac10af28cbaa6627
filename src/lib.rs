#![doc = include_str!("../README.md")]

pub mod attribute;
pub mod diagnostics;
mod element;
pub mod import;
pub mod mesh;
pub mod prelude;
pub mod reader;
pub mod select;
#[cfg(test)]
pub(crate) mod testing;
pub mod topology;
mod traits;
mod write_vtp;

pub use traits::{ElementBlockSource, PartSource, VariableInfo, VariableSource};

pub use element::{ElementType, Topology};

pub use diagnostics::{Diagnostic, Diagnostics};
pub use import::{import_case, import_parts, ImportOptions};
pub use mesh::{Attribute, AttributeData, Mesh};
pub use select::{ConfigurationError, PartFilter, VariableRequest};
pub use topology::FlattenedTopology;

pub use reader::{read_case, FileHandle, ReadError};
pub use write_vtp::{write_vtp, write_vtp_file, Encoding};

pub use ndarray;

/// general purpose error enumeration for every fatal cause of an import failure.
///
/// Skipped parts and variables are not errors, they are reported through [`Diagnostics`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid import options: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Part `{part}`, element block {block}: unsupported element type `{tag}`")]
    UnsupportedElementType {
        part: String,
        block: usize,
        tag: String,
    },
    #[error("Part `{part}`, element block {block}: node counts add up to {expected} but the connectivity has {found} entries")]
    ConnectivityMismatch {
        part: String,
        block: usize,
        expected: usize,
        found: usize,
    },
    #[error("Part `{part}`, element block {block}: topology does not fit into 32 bit indices")]
    CapacityExceeded { part: String, block: usize },
    #[error("Part `{part}` has node coordinates of shape {rows}x{columns}, expected {node_count}x3")]
    CoordinateShape {
        part: String,
        rows: usize,
        columns: usize,
        node_count: usize,
    },
    #[error("Part `{part}`: polygon {polygon} has {loop_total} vertices, at least 3 are required")]
    DegeneratePolygon {
        part: String,
        polygon: usize,
        loop_total: i32,
    },
    #[error("Part `{part}` has {loop_start} loop starts but {loop_total} loop totals")]
    LoopCount {
        part: String,
        loop_start: usize,
        loop_total: usize,
    },
    #[error("Part `{part}`: polygon {polygon} starts at {found}, expected {expected}")]
    LoopStart {
        part: String,
        polygon: usize,
        found: i32,
        expected: usize,
    },
    #[error("Part `{part}`: polygons cover {covered} vertex indices but there are {found}")]
    LoopCoverage {
        part: String,
        covered: usize,
        found: usize,
    },
    #[error("Part `{part}`: vertex index {index} at position {position} is outside of the {node_count} nodes of the part")]
    IndexOutOfRange {
        part: String,
        position: usize,
        index: i32,
        node_count: usize,
    },
    #[error("Part `{part}`: variable `{variable}` has {found} values, expected one per node ({expected})")]
    AttributeLength {
        part: String,
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("Part `{part}`: variable `{variable}` has {found} components per node, expected {expected}")]
    AttributeShape {
        part: String,
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("Part `{part}` already has an attribute named `{name}`")]
    DuplicateAttribute { part: String, name: String },
    #[error(transparent)]
    Read(ReadError),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}

impl From<ReadError> for Error {
    fn from(error: ReadError) -> Self {
        match error {
            ReadError::Geometry(reader::GeometryError::UnknownBlockType(unknown)) => {
                Error::UnsupportedElementType {
                    part: unknown.part_name,
                    block: unknown.block,
                    tag: unknown.tag,
                }
            }
            other => Error::Read(other),
        }
    }
}
