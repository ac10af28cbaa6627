//! Parsing of the text `.case` file that ties the geometry and variable files of an EnSight
//! Gold case together.

use super::error::{self, CaseParseError, ReadError};
use super::geometry::GeometryFile;
use super::variable::{VariableFile, VariableLocation, VariableType};

use std::path::{Path, PathBuf};

/// Read and parse a `.case` file
pub fn read_case<P: AsRef<Path>>(path: P) -> Result<Case, ReadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CaseParseError::from(error::OpenFile::from_path(path, e)))?;

    let case = parse_case(path, &contents)?;
    Ok(case)
}

/// One `time set` from the `TIME` section
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSet {
    pub time_set: u32,
    pub description: Option<String>,
    pub number_of_steps: usize,
    /// number substituted into wildcard file names, one per step
    pub filename_numbers: Vec<u32>,
    pub time_values: Vec<f64>,
}

/// A variable declared in the `VARIABLE` section
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescriptor {
    pub variable_name: String,
    pub variable_type: VariableType,
    pub variable_location: VariableLocation,
    pub time_set: Option<u32>,
    /// file name as written in the case file, possibly containing `*` wildcards
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
struct GeometryModel {
    time_set: Option<u32>,
    filename: String,
}

/// A parsed EnSight Gold case
#[derive(Debug, Clone)]
pub struct Case {
    case_path: PathBuf,
    geometry: GeometryModel,
    variables: Vec<VariableDescriptor>,
    time_sets: Vec<TimeSet>,
}

impl Case {
    pub fn case_path(&self) -> &Path {
        &self.case_path
    }

    fn directory(&self) -> &Path {
        self.case_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Index the geometry file for `timestep`. Static geometry resolves to the same file for
    /// every timestep.
    pub fn get_geometry_model(&self, timestep: usize) -> Result<GeometryFile, ReadError> {
        GeometryFile::from_file(&self.geometry_path(timestep)?)
    }

    /// path of the geometry file of `timestep`
    pub fn geometry_path(&self, timestep: usize) -> Result<PathBuf, ReadError> {
        let path = self.resolve_path(&self.geometry.filename, self.geometry.time_set, timestep)?;
        Ok(path)
    }

    /// path of the file holding `descriptor` at `timestep`
    pub fn variable_path(
        &self,
        descriptor: &VariableDescriptor,
        timestep: usize,
    ) -> Result<PathBuf, ReadError> {
        let path = self.resolve_path(&descriptor.filename, descriptor.time_set, timestep)?;
        Ok(path)
    }

    /// variable names in case file order
    pub fn get_variables(&self) -> Vec<&str> {
        self.variables
            .iter()
            .map(|variable| variable.variable_name.as_str())
            .collect()
    }

    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    /// Index the file of variable `name` for `timestep` against the geometry of that timestep
    pub fn get_variable(&self, name: &str, timestep: usize) -> Result<VariableFile, ReadError> {
        let descriptor = self
            .variables
            .iter()
            .find(|variable| variable.variable_name == name)
            .ok_or_else(|| CaseParseError::from(error::UnknownVariable::new(name.to_string())))?;

        let geometry = self.get_geometry_model(timestep)?;
        self.read_variable(descriptor, timestep, &geometry)
    }

    /// Index a variable file against an already indexed geometry
    pub fn read_variable(
        &self,
        descriptor: &VariableDescriptor,
        timestep: usize,
        geometry: &GeometryFile,
    ) -> Result<VariableFile, ReadError> {
        VariableFile::from_file(&self.variable_path(descriptor, timestep)?, descriptor, geometry)
    }

    pub fn time_sets(&self) -> &[TimeSet] {
        &self.time_sets
    }

    pub fn get_time_set(&self, time_set: u32) -> Option<&TimeSet> {
        self.time_sets.iter().find(|set| set.time_set == time_set)
    }

    /// solution times of `time_set`, one per step
    pub fn get_time_values(&self, time_set: u32) -> Option<&[f64]> {
        self.get_time_set(time_set)
            .map(|set| set.time_values.as_slice())
    }

    /// true if any file of the case changes over time
    pub fn is_transient(&self) -> bool {
        self.geometry.filename.contains('*')
            || self
                .variables
                .iter()
                .any(|variable| variable.filename.contains('*'))
    }

    fn resolve_path(
        &self,
        filename: &str,
        time_set: Option<u32>,
        timestep: usize,
    ) -> Result<PathBuf, CaseParseError> {
        if !filename.contains('*') {
            return Ok(self.directory().join(filename));
        }

        let set = time_set
            .and_then(|id| self.get_time_set(id))
            .ok_or_else(|| error::MissingTimeSet::new(filename.to_string(), time_set))?;

        let number = set
            .filename_numbers
            .get(timestep)
            .filter(|_| timestep < set.number_of_steps)
            .ok_or_else(|| {
                error::TimestepOutOfRange::new(timestep, set.time_set, set.number_of_steps)
            })?;

        Ok(self
            .directory()
            .join(substitute_wildcards(filename, *number)))
    }
}

/// replace the run of `*` in `filename` with `number`, zero padded to the width of the run
fn substitute_wildcards(filename: &str, number: u32) -> String {
    let start = match filename.find('*') {
        Some(start) => start,
        None => return filename.to_string(),
    };
    let width = filename[start..].chars().take_while(|c| *c == '*').count();

    format!(
        "{}{:0width$}{}",
        &filename[..start],
        number,
        &filename[start + width..],
        width = width
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Start,
    Format,
    Geometry,
    Variable,
    Time,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberList {
    FilenameNumbers,
    TimeValues,
}

#[derive(Debug, Default)]
struct TimeSetBuilder {
    time_set: u32,
    description: Option<String>,
    number_of_steps: Option<usize>,
    start_number: Option<u32>,
    increment: Option<u32>,
    filename_numbers: Vec<u32>,
    time_values: Vec<f64>,
}

impl TimeSetBuilder {
    fn build(self) -> TimeSet {
        let number_of_steps = self
            .number_of_steps
            .unwrap_or_else(|| self.time_values.len().max(self.filename_numbers.len()));

        let filename_numbers = if self.filename_numbers.is_empty() {
            let start = self.start_number.unwrap_or(0);
            let increment = self.increment.unwrap_or(1);
            (0..number_of_steps)
                .map(|step| filename_number(start, increment, step))
                .collect()
        } else {
            self.filename_numbers
        };

        TimeSet {
            time_set: self.time_set,
            description: self.description,
            number_of_steps,
            filename_numbers,
            time_values: self.time_values,
        }
    }
}

/// `start + step * increment`, saturating at `u32::MAX`
fn filename_number(start: u32, increment: u32, step: usize) -> u32 {
    u32::try_from(step)
        .ok()
        .and_then(|step| step.checked_mul(increment))
        .and_then(|offset| start.checked_add(offset))
        .unwrap_or(u32::MAX)
}

/// Parse the contents of a case file. `case_path` is used to resolve the data files
/// relative to the case file.
pub fn parse_case(case_path: &Path, contents: &str) -> Result<Case, CaseParseError> {
    let mut section = Section::Start;
    let mut pending_list: Option<NumberList> = None;

    let mut format: Option<String> = None;
    let mut geometry: Option<GeometryModel> = None;
    let mut variables = Vec::new();
    let mut time_sets: Vec<TimeSetBuilder> = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        let malformed = || error::MalformedLine::new(line_number, raw.to_string());

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = section_header(line) {
            section = header;
            pending_list = None;
            continue;
        }

        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => {
                // continuation of a number list from the previous line
                let (Section::Time, Some(list)) = (section, pending_list) else {
                    return Err(malformed().into());
                };
                let builder = time_sets.last_mut().ok_or_else(malformed)?;
                push_numbers(builder, list, line).map_err(|_| malformed())?;
                continue;
            }
        };
        pending_list = None;

        match section {
            Section::Start => return Err(malformed().into()),
            Section::Format => {
                if key == "type" {
                    format = Some(value.to_string());
                }
            }
            Section::Geometry => {
                if key == "model" {
                    geometry = Some(parse_model(value, line_number, raw)?);
                } else {
                    log::debug!("ignoring geometry entry `{key}` on line {line_number}");
                }
            }
            Section::Variable => {
                if let Some(variable) = parse_variable(key, value, line_number, raw)? {
                    variables.push(variable);
                }
            }
            Section::Time => {
                if key == "time set" {
                    let mut tokens = value.splitn(2, char::is_whitespace);
                    let time_set = tokens
                        .next()
                        .and_then(|id| id.parse().ok())
                        .ok_or_else(malformed)?;
                    let description = tokens
                        .next()
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(String::from);
                    time_sets.push(TimeSetBuilder {
                        time_set,
                        description,
                        ..Default::default()
                    });
                    continue;
                }

                // a lone time set may omit its `time set:` line
                if time_sets.is_empty() {
                    time_sets.push(TimeSetBuilder {
                        time_set: 1,
                        ..Default::default()
                    });
                }
                let builder = time_sets.last_mut().ok_or_else(malformed)?;

                match key {
                    "number of steps" => {
                        builder.number_of_steps = Some(value.parse().map_err(|_| malformed())?)
                    }
                    "filename start number" => {
                        builder.start_number = Some(value.parse().map_err(|_| malformed())?)
                    }
                    "filename increment" => {
                        builder.increment = Some(value.parse().map_err(|_| malformed())?)
                    }
                    "filename numbers" => {
                        push_numbers(builder, NumberList::FilenameNumbers, value)
                            .map_err(|_| malformed())?;
                        pending_list = Some(NumberList::FilenameNumbers);
                    }
                    "time values" => {
                        push_numbers(builder, NumberList::TimeValues, value)
                            .map_err(|_| malformed())?;
                        pending_list = Some(NumberList::TimeValues);
                    }
                    _ => log::debug!("ignoring time entry `{key}` on line {line_number}"),
                }
            }
            Section::Ignored => {}
        }
    }

    match format {
        Some(format) if format.eq_ignore_ascii_case("ensight gold") => {}
        Some(format) => return Err(error::UnsupportedFormat::new("ensight gold", format).into()),
        None => return Err(error::MissingSection::new("FORMAT").into()),
    }

    let geometry = geometry.ok_or_else(|| error::MissingSection::new("GEOMETRY"))?;

    Ok(Case {
        case_path: case_path.to_path_buf(),
        geometry,
        variables,
        time_sets: time_sets.into_iter().map(TimeSetBuilder::build).collect(),
    })
}

/// section headers are upper case words without a colon
fn section_header(line: &str) -> Option<Section> {
    let starts_alphabetic = line.chars().next().map_or(false, char::is_alphabetic);
    if line.contains(':') || !starts_alphabetic || line != line.to_ascii_uppercase() {
        return None;
    }

    let section = match line {
        "FORMAT" => Section::Format,
        "GEOMETRY" => Section::Geometry,
        "VARIABLE" => Section::Variable,
        "TIME" => Section::Time,
        _ => Section::Ignored,
    };
    Some(section)
}

fn push_numbers(builder: &mut TimeSetBuilder, list: NumberList, text: &str) -> Result<(), ()> {
    for token in text.split_whitespace() {
        match list {
            NumberList::FilenameNumbers => {
                builder.filename_numbers.push(token.parse().map_err(|_| ())?)
            }
            NumberList::TimeValues => builder.time_values.push(token.parse().map_err(|_| ())?),
        }
    }
    Ok(())
}

/// split off up to two leading time set / file set numbers
fn leading_time_set(tokens: &[&str]) -> Result<Option<u32>, ()> {
    match tokens {
        [] => Ok(None),
        [ts] | [ts, _] => ts.parse().map(Some).map_err(|_| ()),
        _ => Err(()),
    }
}

/// `model: [ts] [fs] filename [change_coords_only [cstep]]`
fn parse_model(
    value: &str,
    line_number: usize,
    raw: &str,
) -> Result<GeometryModel, CaseParseError> {
    let malformed = || error::MalformedLine::new(line_number, raw.to_string());
    let tokens: Vec<&str> = value.split_whitespace().collect();

    if tokens.contains(&"change_coords_only") {
        return Err(error::UnsupportedFeature::new(
            "change_coords_only geometry",
            format!("case file line {line_number}"),
        )
        .into());
    }

    let (filename, leading) = tokens.split_last().ok_or_else(malformed)?;
    let time_set = leading_time_set(leading).map_err(|_| malformed())?;

    Ok(GeometryModel {
        time_set,
        filename: filename.to_string(),
    })
}

fn variable_kind(key: &str) -> Option<(VariableType, VariableLocation)> {
    let (kind, location) = key.rsplit_once(" per ")?;
    let location = match location.trim() {
        "node" => VariableLocation::PerNode,
        "element" => VariableLocation::PerElement,
        _ => return None,
    };
    let variable_type = match kind.trim() {
        "scalar" => VariableType::Scalar,
        "vector" => VariableType::Vector,
        "tensor symm" => VariableType::TensorSymm,
        "tensor asym" => VariableType::TensorAsym,
        "complex scalar" => VariableType::ComplexScalar,
        "complex vector" => VariableType::ComplexVector,
        _ => return None,
    };
    Some((variable_type, location))
}

/// `<type> per <node|element>: [ts] [fs] description filename`; complex variables carry
/// `description real_filename imaginary_filename frequency` instead
fn parse_variable(
    key: &str,
    value: &str,
    line_number: usize,
    raw: &str,
) -> Result<Option<VariableDescriptor>, CaseParseError> {
    let malformed = || error::MalformedLine::new(line_number, raw.to_string());

    let (variable_type, variable_location) = match variable_kind(key) {
        Some(kind) => kind,
        None => {
            log::debug!("ignoring variable entry `{key}` on line {line_number}");
            return Ok(None);
        }
    };

    let tokens: Vec<&str> = value.split_whitespace().collect();
    let trailing = match variable_type {
        VariableType::ComplexScalar | VariableType::ComplexVector => 4,
        _ => 2,
    };
    if tokens.len() < trailing {
        return Err(malformed().into());
    }

    let (leading, named) = tokens.split_at(tokens.len() - trailing);
    let time_set = leading_time_set(leading).map_err(|_| malformed())?;

    Ok(Some(VariableDescriptor {
        variable_name: named[0].to_string(),
        variable_type,
        variable_location,
        time_set,
        filename: named[1].to_string(),
    }))
}
