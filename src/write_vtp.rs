use crate::mesh::{AttributeData, Mesh};
use crate::Error;

use num_traits::ToBytes;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use std::io::Write;
use std::path::Path;

/// the encoding to use when writing an inline dataarray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Base64,
}

impl Encoding {
    fn to_str(&self) -> &'static str {
        match &self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }
}

/// numbers that can be written to a `DataArray`
trait Numeric: Copy + ToBytes {
    const VTK_TYPE: &'static str;

    fn push_ascii(self, out: &mut String);
}

impl Numeric for f32 {
    const VTK_TYPE: &'static str = "Float32";

    fn push_ascii(self, out: &mut String) {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(self));
    }
}

impl Numeric for i32 {
    const VTK_TYPE: &'static str = "Int32";

    fn push_ascii(self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

/// Write `mesh` as a VTK XML PolyData (`.vtp`) document.
///
/// Vertices become points, polygons become `Polys` and every attribute is written as point
/// data with the attribute name. All arrays are written inline with the given encoding.
pub fn write_vtp<W: Write>(writer: W, mesh: &Mesh, encoding: Encoding) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    writer.write_event(Event::Start(BytesStart::new("VTKFile").with_attributes([
        ("type", "PolyData"),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("PolyData")))?;

    let points = mesh.number_of_vertices().to_string();
    let polys = mesh.number_of_polygons().to_string();
    writer.write_event(Event::Start(BytesStart::new("Piece").with_attributes([
        ("NumberOfPoints", points.as_str()),
        ("NumberOfVerts", "0"),
        ("NumberOfLines", "0"),
        ("NumberOfStrips", "0"),
        ("NumberOfPolys", polys.as_str()),
    ])))?;

    writer.write_event(Event::Start(BytesStart::new("PointData")))?;
    for attribute in &mesh.attributes {
        match &attribute.data {
            AttributeData::Scalar(values) => {
                write_inline_dataarray(&mut writer, &attribute.name, 1, values, encoding)?
            }
            AttributeData::Vector(values) => write_inline_dataarray(
                &mut writer,
                &attribute.name,
                3,
                &values.concat(),
                encoding,
            )?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new("PointData")))?;

    writer.write_event(Event::Start(BytesStart::new("Points")))?;
    write_inline_dataarray(&mut writer, "Points", 3, &mesh.vertices.concat(), encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Points")))?;

    // vtk stores where each polygon ends, not where it starts
    let offsets: Vec<i32> = mesh
        .loop_start
        .iter()
        .zip(mesh.loop_total.iter())
        .map(|(start, total)| start.saturating_add(*total))
        .collect();

    writer.write_event(Event::Start(BytesStart::new("Polys")))?;
    write_inline_dataarray(&mut writer, "connectivity", 1, &mesh.vertex_index, encoding)?;
    write_inline_dataarray(&mut writer, "offsets", 1, &offsets, encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Polys")))?;

    writer.write_event(Event::End(BytesEnd::new("Piece")))?;
    writer.write_event(Event::End(BytesEnd::new("PolyData")))?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    Ok(())
}

/// Write `mesh` to a new `.vtp` file at `path`
pub fn write_vtp_file<P: AsRef<Path>>(path: P, mesh: &Mesh, encoding: Encoding) -> Result<(), Error> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_vtp(&mut writer, mesh, encoding)?;
    writer.flush()?;
    Ok(())
}

fn write_inline_dataarray<W: Write, T: Numeric>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    values: &[T],
    encoding: Encoding,
) -> Result<(), Error> {
    let components = components.to_string();
    writer.write_event(Event::Start(BytesStart::new("DataArray").with_attributes([
        ("type", T::VTK_TYPE),
        ("Name", name),
        ("NumberOfComponents", components.as_str()),
        ("format", encoding.to_str()),
    ])))?;

    let data = match encoding {
        Encoding::Ascii => {
            let mut data = String::new();
            for value in values {
                value.push_ascii(&mut data);
                data.push(' ');
            }
            data
        }
        Encoding::Base64 => {
            let size = values.len() * std::mem::size_of::<T>();
            let mut byte_data: Vec<u8> = Vec::with_capacity(size + 8);

            // inline binary data starts with its length in bytes, see `header_type`
            byte_data.extend_from_slice(&(size as u64).to_le_bytes());
            values
                .iter()
                .for_each(|value| byte_data.extend_from_slice(value.to_le_bytes().as_ref()));

            base64::encode(byte_data.as_slice())
        }
    };

    writer.write_event(Event::Text(BytesText::new(&data)))?;
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}
