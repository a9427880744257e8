//! Named axis metadata.

use crate::array::{Array, Range};
use crate::error::{GridError, Result};
use std::fmt;

/// Physical role of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DimensionKind {
    /// West-east axis.
    X,
    /// South-north axis.
    Y,
    /// Vertical axis.
    Z,
    /// Time axis.
    T,
    /// Anything else.
    #[default]
    Other,
}

/// A named axis with optional coordinate values.
///
/// A staggered dimension samples cell edges rather than cell centers.
/// Dimensions are immutable; the `with_*` methods return new values, so a
/// dimension can be shared between arrays without aliasing surprises.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    name: String,
    length: usize,
    coordinate_values: Option<Array>,
    staggered: bool,
    kind: DimensionKind,
}

impl Dimension {
    /// Create a dimension without coordinate values.
    pub fn new(name: impl Into<String>, length: usize) -> Self {
        Self {
            name: name.into(),
            length,
            coordinate_values: None,
            staggered: false,
            kind: DimensionKind::Other,
        }
    }

    /// Create a dimension whose length is taken from its coordinate values.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if `values` is not one-dimensional.
    pub fn with_values(name: impl Into<String>, values: Array) -> Result<Self> {
        let name = name.into();
        if values.rank() != 1 {
            return Err(GridError::shape_mismatch(format!(
                "coordinate values of dimension {} must be 1-D, got shape {:?}",
                name,
                values.shape()
            )));
        }
        Ok(Self {
            length: values.size(),
            coordinate_values: Some(values),
            ..Self::new(name, 0)
        })
    }

    /// Set the staggered flag.
    #[must_use]
    pub fn staggered(mut self, staggered: bool) -> Self {
        self.staggered = staggered;
        self
    }

    /// Set the physical role.
    #[must_use]
    pub fn with_kind(mut self, kind: DimensionKind) -> Self {
        self.kind = kind;
        self
    }

    /// A copy with new coordinate values and stagger flag.
    ///
    /// The length follows the new values.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if `values` is not one-dimensional.
    pub fn with_coordinate_values(&self, values: Array, staggered: bool) -> Result<Self> {
        Ok(Self::with_values(self.name.clone(), values)?
            .staggered(staggered)
            .with_kind(self.kind))
    }

    /// Dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of points.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Physical role.
    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    /// Whether the axis sits on cell edges.
    pub fn is_staggered(&self) -> bool {
        self.staggered
    }

    /// Coordinate values, if known.
    pub fn coordinate_values(&self) -> Option<&Array> {
        self.coordinate_values.as_ref()
    }

    /// Coordinate at index `i`, if coordinates are known.
    pub fn coordinate(&self, i: usize) -> Option<f64> {
        self.coordinate_values
            .as_ref()
            .and_then(|values| values.get_f64(i).ok())
    }

    /// A new dimension restricted to the indices selected by `range`.
    ///
    /// Coordinate values are copied, never shared with this dimension.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] if `range` reaches past the end of the dimension.
    pub fn section(&self, range: &Range) -> Result<Self> {
        if range.last() >= self.length {
            return Err(GridError::invalid_range(format!(
                "range {} exceeds dimension {} of length {}",
                range, self.name, self.length
            )));
        }
        let coordinate_values = match &self.coordinate_values {
            Some(values) => Some(values.section(std::slice::from_ref(range))?.copy()?),
            None => None,
        };
        Ok(Self {
            name: self.name.clone(),
            length: range.length(),
            coordinate_values,
            staggered: self.staggered,
            kind: self.kind,
        })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.length)?;
        if self.staggered {
            write!(f, " (staggered)")?;
        }
        Ok(())
    }
}
