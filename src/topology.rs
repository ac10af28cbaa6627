//! # Flattening element blocks
//!
//! A part stores its surface as any number of element blocks, each with a single element type.
//! The flattener concatenates all surface blocks into one indexed-polygon topology:
//!
//! * `vertex_index`: 0-based node numbers of every polygon, one polygon after the other
//! * `loop_start`: position in `vertex_index` where each polygon begins
//! * `loop_total`: number of vertices of each polygon
//!
//! For a part with one `tria3` block of three triangles followed by one `nsided` block holding
//! a pentagon and a quadrilateral:
//!
//! ```text
//! loop_total = [3, 3, 3, 5, 4]
//! loop_start = [0, 3, 6, 9, 14]
//! vertex_index.len() == 18
//! ```
//!
//! Blocks that are not surfaces (points, lines, volume elements) are skipped.

use crate::diagnostics::Diagnostics;
use crate::element::{ElementType, Topology};
use crate::prelude::*;

/// Indexed-polygon topology of one part. Indices are 0-based but not yet checked against the
/// node count of the part, [`Mesh::assemble`] does that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedTopology {
    pub vertex_index: Vec<i32>,
    pub loop_start: Vec<i32>,
    pub loop_total: Vec<i32>,
}

impl FlattenedTopology {
    pub fn number_of_polygons(&self) -> usize {
        self.loop_total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loop_total.is_empty()
    }
}

/// Running state while blocks are appended
struct Builder<'a> {
    part: &'a str,
    block: usize,
    topology: FlattenedTopology,
    /// loop start of the next polygon
    next_start: i32,
}

impl<'a> Builder<'a> {
    fn capacity_exceeded(&self) -> Error {
        Error::CapacityExceeded {
            part: self.part.to_string(),
            block: self.block,
        }
    }

    fn push_loop(&mut self, total: i32) -> Result<(), Error> {
        self.topology.loop_start.push(self.next_start);
        self.topology.loop_total.push(total);
        self.next_start = self
            .next_start
            .checked_add(total)
            .ok_or_else(|| self.capacity_exceeded())?;
        Ok(())
    }

    fn push_fixed(&mut self, connectivity: Array2<i32>) -> Result<(), Error> {
        let total = i32::try_from(connectivity.ncols()).map_err(|_| self.capacity_exceeded())?;

        for _ in 0..connectivity.nrows() {
            self.push_loop(total)?;
        }

        // rows are elements, iteration is row-major
        self.topology.vertex_index.extend(connectivity.iter());
        Ok(())
    }

    fn push_nsided(&mut self, node_counts: Vec<i32>, connectivity: Vec<i32>) -> Result<(), Error> {
        let expected = node_counts.iter().try_fold(0usize, |sum, count| {
            usize::try_from(*count).ok().and_then(|count| sum.checked_add(count))
        });

        if expected != Some(connectivity.len()) {
            return Err(Error::ConnectivityMismatch {
                part: self.part.to_string(),
                block: self.block,
                expected: expected.unwrap_or(usize::MAX),
                found: connectivity.len(),
            });
        }

        for total in node_counts {
            self.push_loop(total)?;
        }

        self.topology.vertex_index.extend(connectivity);
        Ok(())
    }

    fn finish(mut self) -> FlattenedTopology {
        // file node numbers are 1-based
        self.topology
            .vertex_index
            .iter_mut()
            .for_each(|index| *index = index.saturating_sub(1));
        self.topology
    }
}

/// Flatten the surface element blocks of `part` into a single polygon topology.
///
/// `data` is the contents of the geometry file the part was indexed from. Blocks are visited in
/// file order, and the order of elements inside a block is kept.
pub fn flatten<P: PartSource>(
    part: &P,
    data: &[u8],
    diagnostics: &mut Diagnostics,
) -> Result<FlattenedTopology, Error> {
    let mut builder = Builder {
        part: part.part_name(),
        block: 0,
        topology: FlattenedTopology::default(),
        next_start: 0,
    };

    for (index, block) in part.element_blocks().iter().enumerate() {
        builder.block = index;

        let tag = block.type_tag();
        let element_type =
            ElementType::from_tag(tag).ok_or_else(|| Error::UnsupportedElementType {
                part: part.part_name().to_string(),
                block: index,
                tag: tag.to_string(),
            })?;

        if element_type.dimension() != 2 {
            diagnostics.debug(format!(
                "Skipping {} {element_type} elements of part {} (not a surface)",
                block.number_of_elements(),
                part.part_name(),
            ));
            continue;
        }

        match element_type.topology() {
            Some(Topology::Fixed(nodes_per_element)) => {
                let connectivity = block.read_connectivity(data)?;
                if connectivity.ncols() != nodes_per_element {
                    return Err(Error::ConnectivityMismatch {
                        part: part.part_name().to_string(),
                        block: index,
                        expected: nodes_per_element,
                        found: connectivity.ncols(),
                    });
                }
                builder.push_fixed(connectivity)?;
            }
            Some(Topology::Variable) => {
                let (node_counts, connectivity) = block.read_connectivity_nsided(data)?;
                builder.push_nsided(node_counts, connectivity)?;
            }
            // only volume elements have no polygon topology and they were skipped above
            None => {
                return Err(Error::UnsupportedElementType {
                    part: part.part_name().to_string(),
                    block: index,
                    tag: tag.to_string(),
                })
            }
        }
    }

    Ok(builder.finish())
}
