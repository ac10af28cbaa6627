//! in-memory parts and variables for unit tests

use crate::prelude::*;
use crate::reader::{VariableLocation, VariableType};

#[derive(Debug, Clone)]
pub(crate) enum FakeConnectivity {
    Fixed(Array2<i32>),
    NSided(Vec<i32>, Vec<i32>),
}

#[derive(Debug, Clone)]
pub(crate) struct FakeBlock {
    tag: String,
    connectivity: FakeConnectivity,
}

impl FakeBlock {
    /// a fixed size block, one array of 1-based node numbers per element
    pub(crate) fn fixed<const N: usize>(tag: &str, elements: Vec<[i32; N]>) -> Self {
        let rows = elements.len();
        let flat: Vec<i32> = elements.into_iter().flatten().collect();
        let connectivity = Array2::from_shape_vec((rows, N), flat).unwrap();

        Self {
            tag: tag.to_string(),
            connectivity: FakeConnectivity::Fixed(connectivity),
        }
    }

    pub(crate) fn nsided(node_counts: Vec<i32>, connectivity: Vec<i32>) -> Self {
        Self {
            tag: "nsided".to_string(),
            connectivity: FakeConnectivity::NSided(node_counts, connectivity),
        }
    }
}

impl ElementBlockSource for FakeBlock {
    fn type_tag(&self) -> &str {
        &self.tag
    }

    fn number_of_elements(&self) -> usize {
        match &self.connectivity {
            FakeConnectivity::Fixed(array) => array.nrows(),
            FakeConnectivity::NSided(counts, _) => counts.len(),
        }
    }

    fn read_connectivity(&self, _: &[u8]) -> Result<Array2<i32>, Error> {
        match &self.connectivity {
            FakeConnectivity::Fixed(array) => Ok(array.clone()),
            FakeConnectivity::NSided(..) => panic!("{} block read as fixed size", self.tag),
        }
    }

    fn read_connectivity_nsided(&self, _: &[u8]) -> Result<(Vec<i32>, Vec<i32>), Error> {
        match &self.connectivity {
            FakeConnectivity::NSided(counts, connectivity) => {
                Ok((counts.clone(), connectivity.clone()))
            }
            FakeConnectivity::Fixed(_) => panic!("{} block read as nsided", self.tag),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakePart {
    part_id: u32,
    name: String,
    coordinates: Array2<f32>,
    blocks: Vec<FakeBlock>,
}

impl FakePart {
    /// a part with `nodes` nodes placed along the x axis
    pub(crate) fn new(name: &str, nodes: usize) -> Self {
        let coordinates =
            Array2::from_shape_fn((nodes, 3), |(node, axis)| if axis == 0 { node as f32 } else { 0.0 });

        Self {
            part_id: 1,
            name: name.to_string(),
            coordinates,
            blocks: Vec::new(),
        }
    }

    pub(crate) fn with_id(mut self, part_id: u32) -> Self {
        self.part_id = part_id;
        self
    }

    pub(crate) fn with_block(mut self, block: FakeBlock) -> Self {
        self.blocks.push(block);
        self
    }
}

impl PartSource for FakePart {
    type Block = FakeBlock;

    fn part_id(&self) -> u32 {
        self.part_id
    }

    fn part_name(&self) -> &str {
        &self.name
    }

    fn number_of_nodes(&self) -> usize {
        self.coordinates.nrows()
    }

    fn element_blocks(&self) -> &[FakeBlock] {
        &self.blocks
    }

    fn read_node_coordinates(&self, _: &[u8]) -> Result<Array2<f32>, Error> {
        Ok(self.coordinates.clone())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeVariable {
    name: String,
    variable_type: VariableType,
    location: VariableLocation,
    values: Vec<(u32, Array2<f32>)>,
}

impl FakeVariable {
    /// per-node values of each listed part id, `(nodes, components)`
    pub(crate) fn new(name: &str, variable_type: VariableType, values: Vec<(u32, Array2<f32>)>) -> Self {
        Self {
            name: name.to_string(),
            variable_type,
            location: VariableLocation::PerNode,
            values,
        }
    }

    pub(crate) fn scalar(name: &str, values: Vec<(u32, Vec<f32>)>) -> Self {
        let values = values
            .into_iter()
            .map(|(part_id, values)| {
                let nodes = values.len();
                (part_id, Array2::from_shape_vec((nodes, 1), values).unwrap())
            })
            .collect();

        Self::new(name, VariableType::Scalar, values)
    }

    pub(crate) fn vector(name: &str, values: Vec<(u32, Vec<[f32; 3]>)>) -> Self {
        let values = values
            .into_iter()
            .map(|(part_id, values)| {
                let nodes = values.len();
                let flat = values.into_iter().flatten().collect();
                (part_id, Array2::from_shape_vec((nodes, 3), flat).unwrap())
            })
            .collect();

        Self::new(name, VariableType::Vector, values)
    }

    pub(crate) fn per_element(mut self) -> Self {
        self.location = VariableLocation::PerElement;
        self
    }
}

impl VariableInfo for FakeVariable {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    fn variable_location(&self) -> VariableLocation {
        self.location
    }
}

impl VariableSource for FakeVariable {
    fn is_defined_for_part_id(&self, part_id: u32) -> bool {
        self.values.iter().any(|(id, _)| *id == part_id)
    }

    fn read_node_data(&self, _: &[u8], part_id: u32) -> Result<Array2<f32>, Error> {
        let (_, values) = self
            .values
            .iter()
            .find(|(id, _)| *id == part_id)
            .unwrap_or_else(|| panic!("{} read for undefined part {part_id}", self.name));
        Ok(values.clone())
    }
}
