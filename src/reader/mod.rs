//! # Reading EnSight Gold cases
//!
//! An EnSight Gold case consists of a text `.case` file that names a geometry file and any
//! number of variable files, optionally one per timestep. This module reads the case file
//! and indexes the *C Binary* geometry and variable files it references.
//!
//! Indexing only walks record headers and stores byte offsets. The arrays themselves are read
//! from a [`FileHandle`], a read-only copy of the whole file. Indexing from the handle as well
//! reads every file exactly once:
//!
//! ```no_run
//! use ensight::reader::{read_case, FileHandle, GeometryFile};
//!
//! let case = read_case("flow.case")?;
//! let handle = FileHandle::open(case.geometry_path(0)?)?;
//! let geometry = GeometryFile::from_handle(&handle)?;
//!
//! for part in &geometry.parts {
//!     let coordinates = part.read_node_coordinates(handle.as_bytes())?;
//!     println!("{}: {} nodes", part.part_name, coordinates.nrows());
//! }
//! # Ok::<(), ensight::reader::ReadError>(())
//! ```
//!
//! Only the C Binary flavour of EnSight Gold is supported: ASCII and Fortran binary files,
//! structured (`block`) parts and partial variable values are rejected with an error.

mod binary;
mod case;
pub mod error;
mod geometry;
#[cfg(test)]
pub(crate) mod testing;
mod variable;

pub use case::{parse_case, read_case, Case, TimeSet, VariableDescriptor};
pub use error::{BinaryError, CaseParseError, GeometryError, ReadError, VariableError};
pub use geometry::{ElementBlock, GeometryFile, GeometryPart, IdHandling};
pub use variable::{VariableFile, VariableLocation, VariableType};

use crate::prelude::*;
use std::path::{Path, PathBuf};

/// Read-only contents of one data file.
///
/// The file is read once when the handle is opened and released when the handle is dropped.
#[derive(Debug, Clone, Deref)]
pub struct FileHandle {
    path: PathBuf,
    #[deref]
    data: Vec<u8>,
}

impl FileHandle {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).map_err(|e| error::OpenFile::from_path(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// wrap bytes that are already in memory
    pub fn from_bytes<P: Into<PathBuf>>(path: P, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
