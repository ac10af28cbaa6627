//! builders for C Binary test files

/// Appends C Binary records to an in-memory buffer
#[derive(Debug, Default)]
pub(crate) struct BinaryWriter {
    bytes: Vec<u8>,
}

impl BinaryWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, text: &str) -> &mut Self {
        let mut record = [0u8; 80];
        record[..text.len()].copy_from_slice(text.as_bytes());
        self.bytes.extend_from_slice(&record);
        self
    }

    pub(crate) fn int(&mut self, value: i32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn ints(&mut self, values: &[i32]) -> &mut Self {
        values.iter().for_each(|value| {
            self.int(*value);
        });
        self
    }

    pub(crate) fn floats(&mut self, values: &[f32]) -> &mut Self {
        for value in values {
            self.bytes.extend_from_slice(&value.to_le_bytes());
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

/// Geometry used throughout the reader tests:
///
/// * part 1 `wall`: 4 nodes, one `tria3` block (2 triangles) and one `bar2` block
/// * part 2 `inlet`: 5 nodes with node ids, one `nsided` block (a pentagon) and one `quad4`
pub(crate) fn sample_geometry() -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer
        .line("C Binary")
        .line("sample geometry")
        .line("written by the test suite")
        .line("node id given")
        .line("element id off")
        .line("extents")
        .floats(&[0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);

    writer
        .line("part")
        .int(1)
        .line("wall")
        .line("coordinates")
        .int(4)
        .ints(&[11, 12, 13, 14])
        .floats(&[0.0, 1.0, 1.0, 0.0])
        .floats(&[0.0, 0.0, 1.0, 1.0])
        .floats(&[0.0, 0.0, 0.0, 0.0])
        .line("tria3")
        .int(2)
        .ints(&[1, 2, 3, 1, 3, 4])
        .line("bar2")
        .int(1)
        .ints(&[1, 2]);

    writer
        .line("part")
        .int(2)
        .line("inlet")
        .line("coordinates")
        .int(5)
        .ints(&[1, 2, 3, 4, 5])
        .floats(&[0.0, 1.0, 2.0, 1.0, 0.0])
        .floats(&[0.0, 0.0, 1.0, 2.0, 1.0])
        .floats(&[5.0, 5.0, 5.0, 5.0, 5.0])
        .line("nsided")
        .int(1)
        .int(5)
        .ints(&[1, 2, 3, 4, 5])
        .line("quad4")
        .int(1)
        .ints(&[1, 2, 3, 4]);

    writer.finish()
}
