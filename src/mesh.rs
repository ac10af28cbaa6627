//! # Meshes
//!
//! The output of an import: one polygon [`Mesh`] per part, with named per-vertex attributes.
//! Meshes are plain data, the host decides how to turn them into scene objects.

use crate::prelude::*;
use crate::topology::FlattenedTopology;

/// values of an attribute, one entry per vertex
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Scalar(Vec<f32>),
    Vector(Vec<[f32; 3]>),
}

impl AttributeData {
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(values) => values.len(),
            Self::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn components(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(_) => 3,
        }
    }
}

/// A named per-vertex attribute
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Attribute {
    pub name: String,
    pub data: AttributeData,
}

/// Polygon mesh of one part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    pub loop_start: Vec<i32>,
    pub loop_total: Vec<i32>,
    pub vertex_index: Vec<i32>,
    /// in insertion order, names are unique
    pub attributes: Vec<Attribute>,
}

impl Mesh {
    /// Build the mesh of a part from its `(node_count, 3)` node coordinates and its flattened
    /// topology.
    ///
    /// Every polygon needs at least 3 vertices, polygons must tile `vertex_index` back to back
    /// and every vertex index must address a node of the part. Invalid topology is rejected,
    /// never repaired.
    pub fn assemble(
        name: &str,
        coordinates: &Array2<f32>,
        topology: FlattenedTopology,
    ) -> Result<Self, Error> {
        let node_count = coordinates.nrows();
        if coordinates.ncols() != 3 {
            return Err(Error::CoordinateShape {
                part: name.to_string(),
                rows: coordinates.nrows(),
                columns: coordinates.ncols(),
                node_count,
            });
        }

        if let Some((polygon, loop_total)) = topology
            .loop_total
            .iter()
            .enumerate()
            .find(|(_, total)| **total < 3)
        {
            return Err(Error::DegeneratePolygon {
                part: name.to_string(),
                polygon,
                loop_total: *loop_total,
            });
        }

        check_loops(name, &topology)?;

        if let Some((position, index)) = topology
            .vertex_index
            .iter()
            .enumerate()
            .find(|(_, index)| usize::try_from(**index).map_or(true, |index| index >= node_count))
        {
            return Err(Error::IndexOutOfRange {
                part: name.to_string(),
                position,
                index: *index,
                node_count,
            });
        }

        let vertices = coordinates
            .rows()
            .into_iter()
            .map(|row| [row[0], row[1], row[2]])
            .collect();

        let FlattenedTopology {
            vertex_index,
            loop_start,
            loop_total,
        } = topology;

        Ok(Self {
            name: name.to_string(),
            vertices,
            loop_start,
            loop_total,
            vertex_index,
            attributes: Vec::new(),
        })
    }

    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn number_of_polygons(&self) -> usize {
        self.loop_total.len()
    }

    /// vertex indices of every polygon, in order
    pub fn polygons(&self) -> impl Iterator<Item = &[i32]> + '_ {
        self.loop_start
            .iter()
            .zip(self.loop_total.iter())
            .map(move |(start, total)| {
                let start = *start as usize;
                &self.vertex_index[start..start + *total as usize]
            })
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Attach a per-vertex attribute. Names must be unique within the mesh.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<(), Error> {
        if self.attribute(&attribute.name).is_some() {
            return Err(Error::DuplicateAttribute {
                part: self.name.clone(),
                name: attribute.name,
            });
        }

        self.attributes.push(attribute);
        Ok(())
    }
}

/// polygon `i` must start where polygon `i - 1` ends, and the last one must end at the end of
/// `vertex_index`. Loop totals are already known to be positive.
fn check_loops(name: &str, topology: &FlattenedTopology) -> Result<(), Error> {
    if topology.loop_start.len() != topology.loop_total.len() {
        return Err(Error::LoopCount {
            part: name.to_string(),
            loop_start: topology.loop_start.len(),
            loop_total: topology.loop_total.len(),
        });
    }

    let mut expected = 0usize;
    for (polygon, (start, total)) in topology
        .loop_start
        .iter()
        .zip(topology.loop_total.iter())
        .enumerate()
    {
        if usize::try_from(*start).ok() != Some(expected) {
            return Err(Error::LoopStart {
                part: name.to_string(),
                polygon,
                found: *start,
                expected,
            });
        }
        expected += *total as usize;
    }

    if expected != topology.vertex_index.len() {
        return Err(Error::LoopCoverage {
            part: name.to_string(),
            covered: expected,
            found: topology.vertex_index.len(),
        });
    }

    Ok(())
}
