//! Indexing of C Binary variable files

use super::binary::{self, RecordReader};
use super::case::VariableDescriptor;
use super::error::{self, BinaryError, ReadError, VariableError};
use super::geometry::GeometryFile;
use super::FileHandle;
use crate::element::ElementType;
use crate::prelude::*;

use std::collections::BTreeMap;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

/// Kind of value stored per node / element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VariableType {
    #[display(fmt = "scalar")]
    Scalar,
    #[display(fmt = "vector")]
    Vector,
    #[display(fmt = "tensor symm")]
    TensorSymm,
    #[display(fmt = "tensor asym")]
    TensorAsym,
    #[display(fmt = "complex scalar")]
    ComplexScalar,
    #[display(fmt = "complex vector")]
    ComplexVector,
}

impl VariableType {
    /// number of floats stored per node / element. Complex variables count the real part only,
    /// which is the file the case references first.
    pub fn components(self) -> usize {
        match self {
            Self::Scalar | Self::ComplexScalar => 1,
            Self::Vector | Self::ComplexVector => 3,
            Self::TensorSymm => 6,
            Self::TensorAsym => 9,
        }
    }
}

/// Where the values of a variable live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VariableLocation {
    #[display(fmt = "per node")]
    PerNode,
    #[display(fmt = "per element")]
    PerElement,
}

#[derive(Debug, Clone, PartialEq)]
enum PartRecord {
    Nodes { offset: u64, number_of_nodes: usize },
    Elements,
}

/// Index of one variable file for one timestep
#[derive(Debug, Clone, PartialEq)]
pub struct VariableFile {
    pub file_path: PathBuf,
    pub variable_name: String,
    pub variable_type: VariableType,
    pub variable_location: VariableLocation,
    pub description: String,
    parts: BTreeMap<u32, PartRecord>,
}

impl VariableFile {
    pub fn from_file(
        path: &Path,
        descriptor: &VariableDescriptor,
        geometry: &GeometryFile,
    ) -> Result<Self, ReadError> {
        let file = std::fs::File::open(path)
            .map_err(|e| VariableError::from(error::OpenFile::from_path(path, e)))?;
        let variable =
            Self::from_reader(path.to_path_buf(), descriptor, geometry, BufReader::new(file))?;
        Ok(variable)
    }

    /// Index the contents of an already loaded variable file
    pub fn from_handle(
        handle: &FileHandle,
        descriptor: &VariableDescriptor,
        geometry: &GeometryFile,
    ) -> Result<Self, ReadError> {
        let reader = Cursor::new(handle.as_bytes());
        let variable = Self::from_reader(handle.path().to_path_buf(), descriptor, geometry, reader)?;
        Ok(variable)
    }

    /// Index a variable file from any seekable source. Value counts come from `geometry`,
    /// which must be the geometry of the same timestep.
    pub fn from_reader<R: Read + Seek>(
        file_path: PathBuf,
        descriptor: &VariableDescriptor,
        geometry: &GeometryFile,
        reader: R,
    ) -> Result<Self, VariableError> {
        let mut reader = RecordReader::new(reader)?;
        let description = reader.read_line()?;
        let components = descriptor.variable_type.components();

        let mut parts = BTreeMap::new();
        while !reader.is_at_end() {
            reader.expect_line("part")?;
            let part_id = reader.read_count("part number")? as u32;
            let part = geometry
                .get_part(part_id)
                .ok_or_else(|| error::UnknownPart::new(part_id))?;

            let record = match descriptor.variable_location {
                VariableLocation::PerNode => {
                    let kind_offset = reader.position();
                    let kind = reader.read_line()?;
                    if !kind.starts_with("coordinates") {
                        let unexpected =
                            error::UnexpectedRecord::new(kind_offset, "coordinates", kind);
                        return Err(BinaryError::from(unexpected).into());
                    }
                    skip_undefined_marker(&mut reader, &kind, kind_offset)?;

                    let offset = reader.position();
                    reader.skip_values(part.number_of_nodes.saturating_mul(components))?;
                    PartRecord::Nodes {
                        offset,
                        number_of_nodes: part.number_of_nodes,
                    }
                }
                VariableLocation::PerElement => {
                    // one record per block, in block order
                    let mut blocks = part.element_blocks.iter();
                    while !reader.is_at_end() && !reader.peek_line()?.starts_with("part") {
                        let offset = reader.position();
                        let line = reader.read_line()?;
                        let tag = line.split_whitespace().next().unwrap_or_default();
                        if ElementType::from_tag(tag).is_none() {
                            return Err(error::UnknownElementType::new(offset, line).into());
                        }
                        skip_undefined_marker(&mut reader, &line, offset)?;

                        let elements = blocks
                            .by_ref()
                            .find(|block| block.type_tag == tag)
                            .map_or(0, |block| block.number_of_elements);
                        reader.skip_values(elements.saturating_mul(components))?;
                    }
                    PartRecord::Elements
                }
            };

            parts.insert(part_id, record);
        }

        Ok(Self {
            file_path,
            variable_name: descriptor.variable_name.clone(),
            variable_type: descriptor.variable_type,
            variable_location: descriptor.variable_location,
            description,
            parts,
        })
    }

    /// true if the file carries values for `part_id`
    pub fn is_defined_for_part_id(&self, part_id: u32) -> bool {
        self.parts.contains_key(&part_id)
    }

    /// ids of all parts the variable is defined for, in ascending order
    pub fn part_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.parts.keys().copied()
    }

    /// Per-node values of `part_id` as a `(number_of_nodes, components)` array
    pub fn read_node_data(&self, data: &[u8], part_id: u32) -> Result<Array2<f32>, ReadError> {
        let not_defined = || {
            VariableError::from(error::NotDefined::new(self.variable_name.clone(), part_id))
        };

        let (offset, nodes) = match self.parts.get(&part_id) {
            Some(PartRecord::Nodes {
                offset,
                number_of_nodes,
            }) => (*offset, *number_of_nodes),
            _ => return Err(not_defined().into()),
        };

        let components = self.variable_type.components();
        let values: Vec<f32> = binary::read_values(data, offset, nodes * components)
            .map_err(VariableError::from)?;

        // stored component by component: all x, then all y, ...
        let array = Array2::from_shape_fn((nodes, components), |(node, component)| {
            values[component * nodes + node]
        });
        Ok(array)
    }
}

/// `coordinates undef` / `<type> undef` records are followed by the value marking undefined
/// entries; `partial` records list a subset of entries, which is not supported
fn skip_undefined_marker<R: Read + Seek>(
    reader: &mut RecordReader<R>,
    record: &str,
    offset: u64,
) -> Result<(), VariableError> {
    let modifier = record.split_whitespace().nth(1);
    match modifier {
        Some("undef") => {
            reader.read_f32()?;
            Ok(())
        }
        Some("partial") => Err(error::UnsupportedFeature::new(
            "partial variable values",
            format!("record `{record}` at byte {offset}"),
        )
        .into()),
        _ => Ok(()),
    }
}

impl VariableInfo for VariableDescriptor {
    fn variable_name(&self) -> &str {
        &self.variable_name
    }

    fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    fn variable_location(&self) -> VariableLocation {
        self.variable_location
    }
}

impl VariableInfo for VariableFile {
    fn variable_name(&self) -> &str {
        &self.variable_name
    }

    fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    fn variable_location(&self) -> VariableLocation {
        self.variable_location
    }
}

impl VariableSource for VariableFile {
    fn is_defined_for_part_id(&self, part_id: u32) -> bool {
        VariableFile::is_defined_for_part_id(self, part_id)
    }

    fn read_node_data(&self, data: &[u8], part_id: u32) -> Result<Array2<f32>, crate::Error> {
        Ok(VariableFile::read_node_data(self, data, part_id)?)
    }
}
