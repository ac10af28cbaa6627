//! # Traits
//!
//! The import pipeline does not depend on how geometry and variable data is stored. It reads
//! through the traits in this module, which the types of [`reader`](crate::reader) implement
//! for C Binary files. Other sources (in-memory meshes, other readers) only need to provide
//! the same raw arrays.
//!
//! Every read takes the bytes of an already opened file handle. Sources that do not read
//! from a file may ignore the argument.

use crate::element::ElementType;
use crate::reader::{VariableLocation, VariableType};
use crate::Error;
use ndarray::Array2;

/// One contiguous block of elements of a single type
pub trait ElementBlockSource {
    /// the element type exactly as the source names it, e.g. `"tria3"` or `"g_nsided"`
    fn type_tag(&self) -> &str;

    fn number_of_elements(&self) -> usize;

    /// `(number_of_elements, nodes_per_element)` array of 1-based node numbers, for fixed
    /// size element types
    fn read_connectivity(&self, data: &[u8]) -> Result<Array2<i32>, Error>;

    /// node count of every polygon plus their concatenated 1-based node numbers, for the
    /// `nsided` element type
    fn read_connectivity_nsided(&self, data: &[u8]) -> Result<(Vec<i32>, Vec<i32>), Error>;
}

/// One named region of the geometry
pub trait PartSource {
    type Block: ElementBlockSource;

    fn part_id(&self) -> u32;

    fn part_name(&self) -> &str;

    fn number_of_nodes(&self) -> usize;

    /// element blocks in file order
    fn element_blocks(&self) -> &[Self::Block];

    /// `(number_of_nodes, 3)` array of node positions
    fn read_node_coordinates(&self, data: &[u8]) -> Result<Array2<f32>, Error>;

    /// true if at least one element block holds surface (dimension 2) elements
    fn is_surface(&self) -> bool {
        self.element_blocks().iter().any(|block| {
            ElementType::from_tag(block.type_tag())
                .map_or(false, |element_type| element_type.dimension() == 2)
        })
    }
}

/// Metadata of a field variable, available before its file is read
pub trait VariableInfo {
    fn variable_name(&self) -> &str;

    fn variable_type(&self) -> VariableType;

    fn variable_location(&self) -> VariableLocation;
}

/// A field variable whose values can be read per part
pub trait VariableSource: VariableInfo {
    fn is_defined_for_part_id(&self, part_id: u32) -> bool;

    /// `(number_of_nodes, components)` array of the values of a per-node variable
    fn read_node_data(&self, data: &[u8], part_id: u32) -> Result<Array2<f32>, Error>;
}
