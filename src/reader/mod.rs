//! The read contract between data-format readers and the array core.
//!
//! A reader describes its contents as [`Variable`]s and, on request, fills one
//! [`Array`](crate::Array) per variable and attaches the variable's dimensions
//! as a [`DimArray`](crate::DimArray).

mod raw;
mod variable;

pub use raw::{decode_array, encode_array, ByteOrder, RawDataReader};
pub use variable::Variable;

use crate::dim_array::DimArray;
use crate::error::{GridError, Result};

/// A source of variables that can be read into [`DimArray`]s.
pub trait DataReader {
    /// All variables, in file order.
    fn variables(&self) -> &[Variable];

    /// Read the named variable.
    ///
    /// # Errors
    /// Returns [`GridError::VariableNotFound`] for an unknown name, or the
    /// reader's I/O and decoding errors.
    fn read(&self, name: &str) -> Result<DimArray>;

    /// Variable metadata by name.
    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables().iter().find(|v| v.name() == name)
    }

    /// Variable metadata by name, as an error when missing.
    ///
    /// # Errors
    /// Returns [`GridError::VariableNotFound`] for an unknown name.
    fn require_variable(&self, name: &str) -> Result<&Variable> {
        self.variable(name)
            .ok_or_else(|| GridError::variable_not_found(name))
    }
}
