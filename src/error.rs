//! Error types for meteogrid.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for meteogrid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur in meteogrid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Out-of-bounds, empty or malformed range.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Operands or metadata disagree on shape.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Direct element access outside the array.
    #[error("Index {index} out of range for array of size {size}")]
    IndexOutOfRange {
        /// Requested flat index.
        index: usize,
        /// Number of elements in the array.
        size: usize,
    },

    /// Shape cannot be allocated.
    #[error("Cannot allocate array of shape {shape:?}: {reason}")]
    Allocation {
        /// Requested shape.
        shape: Vec<i64>,
        /// Why it was rejected.
        reason: String,
    },

    /// Axis does not exist in the array.
    #[error("Axis {axis} out of bounds for array of rank {rank}")]
    AxisOutOfBounds {
        /// Requested axis.
        axis: usize,
        /// Rank of the array.
        rank: usize,
    },

    /// Integer division by zero.
    #[error("Integer division by zero at element {index}")]
    DivideByZero {
        /// Flat index of the zero divisor.
        index: usize,
    },

    /// Two dimensions share a name.
    #[error("Duplicate dimension: {name}")]
    DuplicateDimension {
        /// Repeated dimension name.
        name: String,
    },

    /// Reader has no variable of this name.
    #[error("Variable not found: {name}")]
    VariableNotFound {
        /// Requested variable name.
        name: String,
    },

    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Create an InvalidRange error.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create an Allocation error.
    pub fn allocation(shape: &[i64], reason: impl Into<String>) -> Self {
        Self::Allocation {
            shape: shape.to_vec(),
            reason: reason.into(),
        }
    }

    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound { name: name.into() }
    }
}
