//! Common traits and types that are useful for working with `ensight`
#![allow(unused_imports)]

pub use crate::traits::{ElementBlockSource, PartSource, VariableInfo, VariableSource};
pub use crate::{Diagnostics, Error, Mesh};

pub(crate) use derive_more::{Constructor, Deref, Display, From};

pub(crate) use ndarray::Array2;
