#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Appends C Binary records to an in-memory buffer
#[derive(Default)]
pub struct BinaryWriter {
    bytes: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        let mut record = [0u8; 80];
        record[..text.len()].copy_from_slice(text.as_bytes());
        self.bytes.extend_from_slice(&record);
        self
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn ints(&mut self, values: &[i32]) -> &mut Self {
        for value in values {
            self.int(*value);
        }
        self
    }

    pub fn floats(&mut self, values: &[f32]) -> &mut Self {
        for value in values {
            self.bytes.extend_from_slice(&value.to_le_bytes());
        }
        self
    }

    /// header of a geometry file without node or element ids
    pub fn geometry_header(&mut self) -> &mut Self {
        self.line("C Binary")
            .line("integration test geometry")
            .line("")
            .line("node id off")
            .line("element id off")
    }

    /// `part` record, name and the coordinates of `nodes` nodes, given as `[x, y, z]` rows
    pub fn part(&mut self, part_id: i32, name: &str, nodes: &[[f32; 3]]) -> &mut Self {
        self.line("part")
            .int(part_id)
            .line(name)
            .line("coordinates")
            .int(nodes.len() as i32);

        for axis in 0..3 {
            let values: Vec<f32> = nodes.iter().map(|node| node[axis]).collect();
            self.floats(&values);
        }
        self
    }

    /// per-node values of one part, given one row per node
    pub fn node_values(&mut self, part_id: i32, values: &[Vec<f32>]) -> &mut Self {
        self.line("part").int(part_id).line("coordinates");

        let components = values.first().map_or(0, |row| row.len());
        for component in 0..components {
            let column: Vec<f32> = values.iter().map(|row| row[component]).collect();
            self.floats(&column);
        }
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

/// A scratch directory for the files of one case, removed when dropped
pub struct CaseDir {
    path: PathBuf,
}

impl CaseDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "ensight-{}-{}",
            name,
            std::process::id()
        ));
        if path.exists() {
            std::fs::remove_dir_all(&path).unwrap();
        }
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, filename: &str, contents: &[u8]) -> PathBuf {
        let path = self.path.join(filename);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for CaseDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub const SQUARE: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

pub const PENTAGON_AND_SQUARE: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [2.0, 1.0, 1.0],
    [1.0, 2.0, 1.0],
    [0.0, 1.0, 1.0],
    [2.0, 2.0, 1.0],
];

/// Geometry with four parts:
///
/// 1. `internalMesh`: one triangle
/// 2. `wall`: two triangles and a line
/// 3. `outlet`: a pentagon followed by a quadrilateral
/// 4. `edges`: lines only
pub fn flow_geometry() -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.geometry_header();

    writer
        .part(1, "internalMesh", &SQUARE[..3])
        .line("tria3")
        .int(1)
        .ints(&[1, 2, 3]);

    writer
        .part(2, "wall", &SQUARE)
        .line("tria3")
        .int(2)
        .ints(&[1, 2, 3, 1, 3, 4])
        .line("bar2")
        .int(1)
        .ints(&[1, 2]);

    writer
        .part(3, "outlet", &PENTAGON_AND_SQUARE)
        .line("nsided")
        .int(1)
        .int(5)
        .ints(&[1, 2, 3, 4, 5])
        .line("quad4")
        .int(1)
        .ints(&[2, 6, 4, 3]);

    writer
        .part(4, "edges", &SQUARE[..2])
        .line("bar2")
        .int(1)
        .ints(&[1, 2]);

    writer.finish()
}

pub const FLOW_CASE: &str = "\
FORMAT
type: ensight gold

GEOMETRY
model: flow.geo

VARIABLE
scalar per node: p p.scl
vector per node: U U.vec
scalar per element: cellZone cellZone.scl
";

/// Write the flow case with its geometry and per-node variables. The per-element variable
/// file is left out.
pub fn write_flow_case(dir: &CaseDir) -> PathBuf {
    dir.write("flow.geo", &flow_geometry());

    let p = BinaryWriter::new()
        .line("pressure")
        .node_values(2, &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]])
        .node_values(3, &(0..6).map(|i| vec![i as f32]).collect::<Vec<_>>())
        .finish();
    dir.write("p.scl", &p);

    let u = BinaryWriter::new()
        .line("velocity")
        .node_values(
            3,
            &(0..6)
                .map(|i| vec![i as f32, 0.0, -(i as f32)])
                .collect::<Vec<_>>(),
        )
        .finish();
    dir.write("U.vec", &u);

    dir.write("flow.case", FLOW_CASE.as_bytes())
}
