//! Indexing of C Binary geometry files.
//!
//! Indexing walks the record headers once and stores the byte offset of every array.
//! Coordinates and connectivity are decoded on demand from a loaded [`FileHandle`](super::FileHandle).

use super::binary::{self, RecordReader};
use super::error::{self, BinaryError, GeometryError, ReadError};
use crate::element::{ElementType, Topology};
use super::FileHandle;
use crate::prelude::*;

use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

/// How node or element ids are handled by a geometry file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdHandling {
    Off,
    Given,
    Assign,
    Ignore,
}

impl IdHandling {
    fn from_line(line: &str) -> Option<Self> {
        let handling = match line.split_whitespace().last()? {
            "off" => Self::Off,
            "given" => Self::Given,
            "assign" => Self::Assign,
            "ignore" => Self::Ignore,
            _ => return None,
        };
        Some(handling)
    }

    /// ids are physically present in the file (and have to be skipped)
    pub fn stored_in_file(self) -> bool {
        matches!(self, Self::Given | Self::Ignore)
    }
}

/// Index of one geometry file: header information and every part it contains, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFile {
    pub file_path: PathBuf,
    pub description: [String; 2],
    pub node_id: IdHandling,
    pub element_id: IdHandling,
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub extents: Option<[f32; 6]>,
    pub parts: Vec<GeometryPart>,
}

impl GeometryFile {
    pub fn from_file(path: &Path) -> Result<Self, ReadError> {
        let file = std::fs::File::open(path)
            .map_err(|e| GeometryError::from(error::OpenFile::from_path(path, e)))?;
        let geometry = Self::from_reader(path.to_path_buf(), BufReader::new(file))?;
        Ok(geometry)
    }

    /// Index the contents of an already loaded geometry file
    pub fn from_handle(handle: &FileHandle) -> Result<Self, ReadError> {
        let reader = Cursor::new(handle.as_bytes());
        let geometry = Self::from_reader(handle.path().to_path_buf(), reader)?;
        Ok(geometry)
    }

    /// Index a geometry file from any seekable source. `file_path` is only recorded.
    pub fn from_reader<R: Read + Seek>(file_path: PathBuf, reader: R) -> Result<Self, GeometryError> {
        let mut reader = RecordReader::new(reader)?;

        let format = reader.read_line()?;
        if !format.to_ascii_lowercase().starts_with("c binary") {
            return Err(error::UnsupportedFormat::new("C Binary", format).into());
        }

        let description = [reader.read_line()?, reader.read_line()?];
        let node_id = read_id_handling(&mut reader, "node id")?;
        let element_id = read_id_handling(&mut reader, "element id")?;

        let mut extents = None;
        if !reader.is_at_end() && reader.peek_line()?.starts_with("extents") {
            reader.read_line()?;
            let mut values = [0.0; 6];
            for value in values.iter_mut() {
                *value = reader.read_f32()?;
            }
            extents = Some(values);
        }

        let mut parts = Vec::new();
        while !reader.is_at_end() {
            parts.push(read_part(&mut reader, node_id, element_id)?);
        }

        Ok(Self {
            file_path,
            description,
            node_id,
            element_id,
            extents,
            parts,
        })
    }

    pub fn get_part(&self, part_id: u32) -> Option<&GeometryPart> {
        self.parts.iter().find(|part| part.part_id == part_id)
    }

    pub fn get_part_by_name(&self, part_name: &str) -> Option<&GeometryPart> {
        self.parts.iter().find(|part| part.part_name == part_name)
    }
}

fn read_id_handling<R: Read + Seek>(
    reader: &mut RecordReader<R>,
    keyword: &'static str,
) -> Result<IdHandling, BinaryError> {
    let offset = reader.position();
    let line = reader.expect_line(keyword)?;
    IdHandling::from_line(&line)
        .ok_or_else(|| error::UnexpectedRecord::new(offset, keyword, line).into())
}

fn read_part<R: Read + Seek>(
    reader: &mut RecordReader<R>,
    node_id: IdHandling,
    element_id: IdHandling,
) -> Result<GeometryPart, GeometryError> {
    let offset = reader.position();
    reader.expect_line("part")?;
    let part_id = reader.read_count("part number")? as u32;
    let part_name = reader.read_line()?;

    let kind_offset = reader.position();
    let kind = reader.read_line()?;
    if kind.starts_with("block") {
        return Err(error::UnsupportedPart::new(part_id, kind).into());
    }
    if !kind.starts_with("coordinates") {
        let unexpected = error::UnexpectedRecord::new(kind_offset, "coordinates", kind);
        return Err(BinaryError::from(unexpected).into());
    }

    let number_of_nodes = reader.read_count("number of nodes")?;
    if node_id.stored_in_file() {
        reader.skip_values(number_of_nodes)?;
    }
    let coordinates_offset = reader.position();
    reader.skip_values(number_of_nodes.saturating_mul(3))?;

    let mut element_blocks = Vec::new();
    while !reader.is_at_end() && !reader.peek_line()?.starts_with("part") {
        let block = element_blocks.len();
        element_blocks.push(read_block(reader, element_id, part_id, &part_name, block)?);
    }

    Ok(GeometryPart {
        part_id,
        part_name,
        offset,
        number_of_nodes,
        coordinates_offset,
        element_blocks,
    })
}

/// Index block number `block` of a part. The length of a block depends on its type, so an
/// unknown type ends indexing of the whole file.
fn read_block<R: Read + Seek>(
    reader: &mut RecordReader<R>,
    element_id: IdHandling,
    part_id: u32,
    part_name: &str,
    block: usize,
) -> Result<ElementBlock, GeometryError> {
    let offset = reader.position();
    let type_tag = reader.read_line()?;
    let element_type = ElementType::from_tag(&type_tag).ok_or_else(|| {
        error::UnknownBlockType::new(part_id, part_name.to_string(), block, offset, type_tag.clone())
    })?;

    let number_of_elements = reader.read_count("number of elements")?;
    if element_id.stored_in_file() {
        reader.skip_values(number_of_elements)?;
    }

    let layout = match element_type.topology() {
        Some(Topology::Fixed(nodes_per_element)) => {
            let connectivity_offset = reader.position();
            reader.skip_values(number_of_elements.saturating_mul(nodes_per_element))?;
            BlockLayout::Fixed {
                connectivity_offset,
                nodes_per_element,
            }
        }
        Some(Topology::Variable) => {
            let node_counts_offset = reader.position();
            let connectivity_len =
                reader.read_count_sum(number_of_elements, "polygon node count")?;
            let connectivity_offset = reader.position();
            reader.skip_values(connectivity_len)?;
            BlockLayout::NSided {
                node_counts_offset,
                connectivity_offset,
                connectivity_len,
            }
        }
        None => {
            let faces = reader.read_count_sum(number_of_elements, "polyhedron face count")?;
            let nodes = reader.read_count_sum(faces, "face node count")?;
            reader.skip_values(nodes)?;
            BlockLayout::NFaced
        }
    };

    Ok(ElementBlock {
        offset,
        element_type,
        type_tag,
        number_of_elements,
        layout,
    })
}

/// One part of a geometry file
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPart {
    pub part_id: u32,
    pub part_name: String,
    /// byte offset of the `part` record
    pub offset: u64,
    pub number_of_nodes: usize,
    coordinates_offset: u64,
    pub element_blocks: Vec<ElementBlock>,
}

impl GeometryPart {
    /// Node positions as a `(number_of_nodes, 3)` array
    pub fn read_node_coordinates(&self, data: &[u8]) -> Result<Array2<f32>, ReadError> {
        let nodes = self.number_of_nodes;
        let values: Vec<f32> = binary::read_values(data, self.coordinates_offset, nodes * 3)
            .map_err(GeometryError::from)?;

        // the file stores all x, then all y, then all z
        let coordinates = Array2::from_shape_fn((nodes, 3), |(node, axis)| values[axis * nodes + node]);
        Ok(coordinates)
    }

    /// true if the part has at least one block of surface elements
    pub fn is_surface(&self) -> bool {
        self.element_blocks
            .iter()
            .any(|block| block.element_type.dimension() == 2)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BlockLayout {
    Fixed {
        connectivity_offset: u64,
        nodes_per_element: usize,
    },
    NSided {
        node_counts_offset: u64,
        connectivity_offset: u64,
        connectivity_len: usize,
    },
    NFaced,
}

/// One element block of a part
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBlock {
    /// byte offset of the element type record
    pub offset: u64,
    pub element_type: ElementType,
    /// element type as written in the file, including a possible ghost prefix
    pub type_tag: String,
    pub number_of_elements: usize,
    layout: BlockLayout,
}

impl ElementBlock {
    /// Connectivity of a fixed size element block, one row of 1-based node numbers per element
    pub fn read_connectivity(&self, data: &[u8]) -> Result<Array2<i32>, ReadError> {
        let BlockLayout::Fixed {
            connectivity_offset,
            nodes_per_element,
        } = self.layout
        else {
            return Err(self.layout_error("fixed size").into());
        };

        let elements = self.number_of_elements;
        let values: Vec<i32> =
            binary::read_values(data, connectivity_offset, elements * nodes_per_element)
                .map_err(GeometryError::from)?;

        let connectivity = Array2::from_shape_fn((elements, nodes_per_element), |(e, n)| {
            values[e * nodes_per_element + n]
        });
        Ok(connectivity)
    }

    /// Node count of every polygon and the concatenated 1-based connectivity of an `nsided`
    /// block
    pub fn read_connectivity_nsided(&self, data: &[u8]) -> Result<(Vec<i32>, Vec<i32>), ReadError> {
        let BlockLayout::NSided {
            node_counts_offset,
            connectivity_offset,
            connectivity_len,
        } = self.layout
        else {
            return Err(self.layout_error("nsided").into());
        };

        let node_counts = binary::read_values(data, node_counts_offset, self.number_of_elements)
            .map_err(GeometryError::from)?;
        let connectivity = binary::read_values(data, connectivity_offset, connectivity_len)
            .map_err(GeometryError::from)?;

        Ok((node_counts, connectivity))
    }

    fn layout_error(&self, expected: &'static str) -> GeometryError {
        error::ConnectivityLayout::new(self.offset, self.type_tag.clone(), expected).into()
    }
}

impl PartSource for GeometryPart {
    type Block = ElementBlock;

    fn part_id(&self) -> u32 {
        self.part_id
    }

    fn part_name(&self) -> &str {
        &self.part_name
    }

    fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    fn element_blocks(&self) -> &[ElementBlock] {
        &self.element_blocks
    }

    fn read_node_coordinates(&self, data: &[u8]) -> Result<Array2<f32>, crate::Error> {
        Ok(GeometryPart::read_node_coordinates(self, data)?)
    }

    fn is_surface(&self) -> bool {
        GeometryPart::is_surface(self)
    }
}

impl ElementBlockSource for ElementBlock {
    fn type_tag(&self) -> &str {
        &self.type_tag
    }

    fn number_of_elements(&self) -> usize {
        self.number_of_elements
    }

    fn read_connectivity(&self, data: &[u8]) -> Result<Array2<i32>, crate::Error> {
        Ok(ElementBlock::read_connectivity(self, data)?)
    }

    fn read_connectivity_nsided(&self, data: &[u8]) -> Result<(Vec<i32>, Vec<i32>), crate::Error> {
        Ok(ElementBlock::read_connectivity_nsided(self, data)?)
    }
}
