use crate::prelude::*;

use std::path::Path;

/// Any failure while reading the files of an EnSight Gold case
#[derive(Debug, thiserror::Error, From)]
pub enum ReadError {
    #[error("{0}")]
    OpenFile(OpenFile),
    #[error("Error reading case file: {0}")]
    Case(CaseParseError),
    #[error("Error reading geometry file: {0}")]
    Geometry(GeometryError),
    #[error("Error reading variable file: {0}")]
    Variable(VariableError),
}

#[derive(Debug, thiserror::Error, From)]
pub enum CaseParseError {
    #[error("{0}")]
    OpenFile(OpenFile),
    #[error("{0}")]
    MalformedLine(MalformedLine),
    #[error("{0}")]
    MissingSection(MissingSection),
    #[error("{0}")]
    UnsupportedFormat(UnsupportedFormat),
    #[error("{0}")]
    UnsupportedFeature(UnsupportedFeature),
    #[error("{0}")]
    MissingTimeSet(MissingTimeSet),
    #[error("{0}")]
    TimestepOutOfRange(TimestepOutOfRange),
    #[error("{0}")]
    UnknownVariable(UnknownVariable),
}

#[derive(Debug, thiserror::Error, From)]
pub enum GeometryError {
    #[error("{0}")]
    OpenFile(OpenFile),
    #[error("{0}")]
    UnsupportedFormat(UnsupportedFormat),
    #[error("{0}")]
    Binary(BinaryError),
    #[error("{0}")]
    UnknownBlockType(UnknownBlockType),
    #[error("{0}")]
    UnsupportedPart(UnsupportedPart),
    #[error("{0}")]
    ConnectivityLayout(ConnectivityLayout),
}

#[derive(Debug, thiserror::Error, From)]
pub enum VariableError {
    #[error("{0}")]
    OpenFile(OpenFile),
    #[error("{0}")]
    Binary(BinaryError),
    #[error("{0}")]
    UnknownPart(UnknownPart),
    #[error("{0}")]
    UnknownElementType(UnknownElementType),
    #[error("{0}")]
    UnsupportedFeature(UnsupportedFeature),
    #[error("{0}")]
    NotDefined(NotDefined),
}

/// Errors from walking the fixed-width records of a C Binary file
#[derive(Debug, thiserror::Error, From)]
pub enum BinaryError {
    #[error("{0}")]
    UnexpectedEof(UnexpectedEof),
    #[error("{0}")]
    UnexpectedRecord(UnexpectedRecord),
    #[error("{0}")]
    NegativeValue(NegativeValue),
    #[error("failed to read from file: {0}")]
    Io(std::io::Error),
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "could not read `{path}`: {source}")]
pub struct OpenFile {
    path: String,
    source: std::io::Error,
}

impl OpenFile {
    pub(crate) fn from_path(path: &Path, source: std::io::Error) -> Self {
        Self::new(path.display().to_string(), source)
    }
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "malformed case file line {line_number}: `{line}`")]
pub struct MalformedLine {
    line_number: usize,
    line: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "case file has no `{section}` section")]
pub struct MissingSection {
    section: &'static str,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "unsupported file format `{found}`, expected {expected}")]
pub struct UnsupportedFormat {
    expected: &'static str,
    found: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "{feature} is not supported ({context})")]
pub struct UnsupportedFeature {
    feature: &'static str,
    context: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "file name `{filename}` needs time set {time_set:?}, which is not defined")]
pub struct MissingTimeSet {
    filename: String,
    time_set: Option<u32>,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "timestep {timestep} is out of range, time set {time_set} has {number_of_steps} steps")]
pub struct TimestepOutOfRange {
    timestep: usize,
    time_set: u32,
    number_of_steps: usize,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "case file does not define variable `{name}`")]
pub struct UnknownVariable {
    name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "unexpected end of file at byte {offset}: {needed} more bytes were needed")]
pub struct UnexpectedEof {
    offset: u64,
    needed: u64,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "unexpected record at byte {offset}: expected `{expected}`, got `{found}`")]
pub struct UnexpectedRecord {
    offset: u64,
    expected: &'static str,
    found: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "negative {what} ({value}) at byte {offset}")]
pub struct NegativeValue {
    offset: u64,
    what: &'static str,
    value: i32,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "unknown element type `{tag}` at byte {offset}")]
pub struct UnknownElementType {
    offset: u64,
    tag: String,
}

/// An element block whose type is unknown. The rest of the file cannot be indexed past it.
#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "unknown element type `{tag}` at byte {offset}, element block {block} of part {part_id} `{part_name}`"
)]
pub struct UnknownBlockType {
    pub part_id: u32,
    pub part_name: String,
    pub block: usize,
    pub offset: u64,
    pub tag: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "part {part_id} is a `{kind}` part, only unstructured `coordinates` parts are supported")]
pub struct UnsupportedPart {
    part_id: u32,
    kind: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "element block `{tag}` at byte {offset} does not store {expected} connectivity")]
pub struct ConnectivityLayout {
    offset: u64,
    tag: String,
    expected: &'static str,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "variable file references part {part_id}, which is not in the geometry")]
pub struct UnknownPart {
    part_id: u32,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "variable `{variable}` has no per-node data for part {part_id}")]
pub struct NotDefined {
    variable: String,
    part_id: u32,
}
