//! Variable metadata.

use crate::array::DataType;
use crate::dimension::Dimension;
use std::collections::HashMap;

/// Metadata of one variable in a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    data_type: DataType,
    dimensions: Vec<Dimension>,
    /// Variable attributes.
    pub attributes: HashMap<String, String>,
}

impl Variable {
    /// Create a variable.
    pub fn new(name: impl Into<String>, data_type: DataType, dimensions: Vec<Dimension>) -> Self {
        Self {
            name: name.into(),
            data_type,
            dimensions,
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type on disk.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Dimensions in axis order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Length of every axis.
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(Dimension::length).collect()
    }

    /// Number of elements, `None` when it overflows.
    pub fn size(&self) -> Option<usize> {
        self.dimensions
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(dim.length()))
    }

    /// Whether any dimension is staggered.
    pub fn is_staggered(&self) -> bool {
        self.dimensions.iter().any(Dimension::is_staggered)
    }
}
