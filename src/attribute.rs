//! Binding per-node field values to mesh vertices.
//!
//! Vertices of a [`Mesh`] are the nodes of its part in the same order, so a per-node variable
//! maps onto the vertices one to one.

use crate::diagnostics::Diagnostics;
use crate::mesh::{Attribute, AttributeData};
use crate::prelude::*;
use crate::reader::{VariableLocation, VariableType};

/// Read `variable` for `part_id` and attach it to `mesh` as an attribute named like the
/// variable.
///
/// Variables that cannot be represented (undefined for the part, per-element values, tensor
/// and complex types) are skipped with a diagnostic and `Ok(false)` is returned. A variable
/// whose values do not match the nodes of the part is an error.
pub fn bind<V: VariableSource>(
    mesh: &mut Mesh,
    part_id: u32,
    variable: &V,
    data: &[u8],
    diagnostics: &mut Diagnostics,
) -> Result<bool, Error> {
    let name = variable.variable_name();

    if !variable.is_defined_for_part_id(part_id) {
        diagnostics.info(format!(
            "Variable {name} is not defined for part {}, skipping",
            mesh.name
        ));
        return Ok(false);
    }

    let variable_type = variable.variable_type();
    let expected_components = match variable_type {
        VariableType::Scalar => 1,
        VariableType::Vector => 3,
        other => {
            diagnostics.warn(format!(
                "Variable {name} has unsupported type {other}, skipping"
            ));
            return Ok(false);
        }
    };

    if variable.variable_location() != VariableLocation::PerNode {
        diagnostics.warn(format!(
            "Variable {name} is stored per element, only per-node variables are supported"
        ));
        return Ok(false);
    }

    let values = variable.read_node_data(data, part_id)?;

    let node_count = mesh.number_of_vertices();
    if values.nrows() != node_count {
        return Err(Error::AttributeLength {
            part: mesh.name.clone(),
            variable: name.to_string(),
            expected: node_count,
            found: values.nrows(),
        });
    }

    if values.ncols() != expected_components {
        return Err(Error::AttributeShape {
            part: mesh.name.clone(),
            variable: name.to_string(),
            expected: expected_components,
            found: values.ncols(),
        });
    }

    let data = if expected_components == 1 {
        AttributeData::Scalar(values.column(0).to_vec())
    } else {
        AttributeData::Vector(
            values
                .rows()
                .into_iter()
                .map(|row| [row[0], row[1], row[2]])
                .collect(),
        )
    };

    mesh.add_attribute(Attribute::new(name.to_string(), data))?;
    diagnostics.debug(format!("Added {variable_type} attribute {name} to {}", mesh.name));

    Ok(true)
}
