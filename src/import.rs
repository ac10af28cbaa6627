//! # Importing a case
//!
//! [`import_case`] runs the whole pipeline for one timestep of a case: select parts and
//! variables, then flatten, assemble and bind every selected part into a [`Mesh`].
//!
//! ```no_run
//! use ensight::{import_case, Diagnostics, ImportOptions};
//!
//! let options = ImportOptions::default()
//!     .with_timestep(3)
//!     .with_requested_variables("p, U");
//!
//! let mut diagnostics = Diagnostics::new();
//! let meshes = import_case("motorBike.case", &options, &mut diagnostics)?;
//!
//! for mesh in &meshes {
//!     println!("{}: {} polygons", mesh.name, mesh.number_of_polygons());
//! }
//! # Ok::<(), ensight::Error>(())
//! ```
//!
//! Skipped parts and variables are reported through [`Diagnostics`]. Any data integrity error
//! aborts the import and no meshes are returned.

use crate::attribute;
use crate::diagnostics::Diagnostics;
use crate::prelude::*;
use crate::reader::{read_case, FileHandle, GeometryFile, ReadError, VariableFile};
use crate::select::{PartFilter, VariableRequest};
use crate::topology;

use std::path::Path;

/// Options of an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// index of the timestep to load, 0 for static cases
    pub timestep: usize,
    /// regular expression of part names to import, empty imports all parts
    pub include_pattern: String,
    /// regular expression of part names to leave out, takes priority over
    /// `include_pattern`, empty leaves out nothing
    pub exclude_pattern: String,
    /// comma separated per-node variable names, `*` for all, empty for none
    pub requested_variables: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            timestep: 0,
            include_pattern: ".*".to_string(),
            exclude_pattern: "internalMesh".to_string(),
            requested_variables: "*".to_string(),
        }
    }
}

impl ImportOptions {
    pub fn with_timestep(mut self, timestep: usize) -> Self {
        self.timestep = timestep;
        self
    }

    pub fn with_include_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.include_pattern = pattern.into();
        self
    }

    pub fn with_exclude_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.exclude_pattern = pattern.into();
        self
    }

    pub fn with_requested_variables<S: Into<String>>(mut self, variables: S) -> Self {
        self.requested_variables = variables.into();
        self
    }
}

/// Import the surface parts of the case at `case_path` as one [`Mesh`] per part, in part
/// order.
///
/// Patterns are checked before any file is opened. The geometry file and the file of every
/// selected variable are each read once into a [`FileHandle`], indexed from memory and
/// released before returning, whether the import succeeds or not.
///
/// An element block of unknown type cannot be skipped, so it fails the import even when its
/// part would not have been selected.
pub fn import_case<P: AsRef<Path>>(
    case_path: P,
    options: &ImportOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Mesh>, Error> {
    let filter = PartFilter::new(&options.include_pattern, &options.exclude_pattern)?;
    let request = VariableRequest::parse(&options.requested_variables);

    let case_path = case_path.as_ref();
    diagnostics.info(format!("Reading case {}", case_path.display()));

    let case = read_case(case_path)?;
    let geometry_handle = FileHandle::open(case.geometry_path(options.timestep)?)?;
    let geometry = GeometryFile::from_handle(&geometry_handle)?;

    let parts = filter.select(&geometry.parts, diagnostics);
    let descriptors = request.select(case.variables(), diagnostics);

    let variable_handles = descriptors
        .iter()
        .map(|descriptor| FileHandle::open(case.variable_path(descriptor, options.timestep)?))
        .collect::<Result<Vec<_>, ReadError>>()?;

    let variables = descriptors
        .iter()
        .zip(variable_handles.iter())
        .map(|(descriptor, handle)| VariableFile::from_handle(handle, descriptor, &geometry))
        .collect::<Result<Vec<_>, _>>()?;

    let variables: Vec<_> = variables
        .iter()
        .zip(variable_handles.iter())
        .map(|(variable, handle)| (variable, handle.as_bytes()))
        .collect();

    let meshes = import_parts(&parts, geometry_handle.as_bytes(), &variables, diagnostics)?;

    diagnostics.info(format!("Finished importing {} parts", meshes.len()));
    Ok(meshes)
}

/// Convert already selected parts and variables.
///
/// `geometry` is the contents of the file the parts were indexed from; every variable comes
/// with the contents of its own file.
pub fn import_parts<P, V>(
    parts: &[&P],
    geometry: &[u8],
    variables: &[(&V, &[u8])],
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Mesh>, Error>
where
    P: PartSource,
    V: VariableSource,
{
    let mut meshes = Vec::with_capacity(parts.len());

    for part in parts {
        diagnostics.info(format!("Reading data for part {}", part.part_name()));
        let mesh = convert_part(*part, geometry, variables, diagnostics)?;
        meshes.push(mesh);
    }

    Ok(meshes)
}

fn convert_part<P, V>(
    part: &P,
    geometry: &[u8],
    variables: &[(&V, &[u8])],
    diagnostics: &mut Diagnostics,
) -> Result<Mesh, Error>
where
    P: PartSource,
    V: VariableSource,
{
    let coordinates = part.read_node_coordinates(geometry)?;
    let topology = topology::flatten(part, geometry, diagnostics)?;
    let mut mesh = Mesh::assemble(part.part_name(), &coordinates, topology)?;

    for (variable, data) in variables {
        attribute::bind(&mut mesh, part.part_id(), *variable, data, diagnostics)?;
    }

    diagnostics.debug(format!(
        "Part {} has {} vertices, {} polygons and {} attributes",
        mesh.name,
        mesh.number_of_vertices(),
        mesh.number_of_polygons(),
        mesh.attributes.len()
    ));

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBlock, FakePart, FakeVariable};

    fn no_variables() -> Vec<(&'static FakeVariable, &'static [u8])> {
        Vec::new()
    }

    #[test]
    fn default_options() {
        let options = ImportOptions::default();
        assert_eq!(options.timestep, 0);
        assert_eq!(options.include_pattern, ".*");
        assert_eq!(options.exclude_pattern, "internalMesh");
        assert_eq!(options.requested_variables, "*");

        let options = options.with_exclude_pattern("").with_timestep(2);
        assert_eq!(options.exclude_pattern, "");
        assert_eq!(options.timestep, 2);
    }

    #[test]
    fn malformed_pattern_fails_before_reading() {
        let options = ImportOptions::default().with_include_pattern("(");
        let mut diagnostics = Diagnostics::new();

        // the case path does not exist, the pattern is reported first
        let err = import_case("does/not/exist.case", &options, &mut diagnostics).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parts_in_order_with_attributes() {
        let wall = FakePart::new("wall", 4)
            .with_id(1)
            .with_block(FakeBlock::fixed("quad4", vec![[1, 2, 3, 4]]));
        let outlet = FakePart::new("outlet", 3)
            .with_id(3)
            .with_block(FakeBlock::fixed("tria3", vec![[1, 2, 3]]));

        let p = FakeVariable::scalar(
            "p",
            vec![(1, vec![0.0, 1.0, 2.0, 3.0]), (3, vec![5.0, 5.0, 5.0])],
        );
        let u = FakeVariable::vector("U", vec![(3, vec![[1.0, 0.0, 0.0]; 3])]);

        let mut diagnostics = Diagnostics::new();
        let meshes = import_parts(
            &[&wall, &outlet],
            &[],
            &[(&p, &[][..]), (&u, &[][..])],
            &mut diagnostics,
        )
        .unwrap();

        let names: Vec<_> = meshes.iter().map(|mesh| mesh.name.as_str()).collect();
        assert_eq!(names, vec!["wall", "outlet"]);

        assert_eq!(meshes[0].attributes.len(), 1);
        assert!(meshes[0].attribute("U").is_none());

        let outlet_attributes: Vec<_> =
            meshes[1].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(outlet_attributes, vec!["p", "U"]);
    }

    #[test]
    fn index_out_of_range_aborts_import() {
        let good = FakePart::new("wall", 3).with_block(FakeBlock::fixed("tria3", vec![[1, 2, 3]]));
        // node number 4 becomes index 3 == node count
        let bad = FakePart::new("outlet", 3)
            .with_id(2)
            .with_block(FakeBlock::fixed("tria3", vec![[1, 2, 4]]));

        let err = import_parts(&[&good, &bad], &[], &no_variables(), &mut Diagnostics::new())
            .unwrap_err();

        match err {
            Error::IndexOutOfRange {
                part,
                index,
                node_count,
                ..
            } => {
                assert_eq!(part, "outlet");
                assert_eq!(index, 3);
                assert_eq!(node_count, 3);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn part_without_polygons_gives_empty_mesh() {
        let lines = FakePart::new("edges", 2).with_block(FakeBlock::fixed("bar2", vec![[1, 2]]));

        let meshes =
            import_parts(&[&lines], &[], &no_variables(), &mut Diagnostics::new()).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].number_of_polygons(), 0);
        assert_eq!(meshes[0].number_of_vertices(), 2);
    }
}
