//! Arrays paired with their dimension metadata.

use crate::array::{Array, Range, Value};
use crate::dimension::Dimension;
use crate::error::{GridError, Result};
use std::collections::HashSet;

/// An [`Array`] with one named [`Dimension`] per axis.
///
/// This is the unit data readers hand to analysis and visualization code.
#[derive(Debug, Clone, PartialEq)]
pub struct DimArray {
    data: Array,
    dimensions: Vec<Dimension>,
}

impl DimArray {
    /// Pair an array with its dimensions.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the dimension lengths do not
    /// match the array shape, or [`GridError::DuplicateDimension`] if two
    /// dimensions share a name.
    pub fn new(data: Array, dimensions: Vec<Dimension>) -> Result<Self> {
        let lengths: Vec<usize> = dimensions.iter().map(Dimension::length).collect();
        if lengths != data.shape() {
            return Err(GridError::shape_mismatch(format!(
                "dimension lengths {:?} do not match array shape {:?}",
                lengths,
                data.shape()
            )));
        }
        let mut seen = HashSet::new();
        for dim in &dimensions {
            if !seen.insert(dim.name()) {
                return Err(GridError::DuplicateDimension {
                    name: dim.name().to_string(),
                });
            }
        }
        Ok(Self { data, dimensions })
    }

    /// The element data.
    pub fn data(&self) -> &Array {
        &self.data
    }

    /// Dimensions in axis order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Dimension of axis `axis`.
    pub fn dimension(&self, axis: usize) -> Option<&Dimension> {
        self.dimensions.get(axis)
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.data.rank()
    }

    /// Split into array and dimensions.
    pub fn into_parts(self) -> (Array, Vec<Dimension>) {
        (self.data, self.dimensions)
    }

    /// Axis index of the dimension called `name`.
    pub fn dimension_index_of(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|dim| dim.name() == name)
    }

    /// Axis index of the first staggered dimension.
    pub fn stagger_dim_index(&self) -> Option<usize> {
        self.dimensions.iter().position(Dimension::is_staggered)
    }

    /// Select a sub-array.
    ///
    /// The data is a view sharing this array's buffer; each dimension is
    /// sectioned individually with its coordinate values copied.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] as [`Array::section`] does.
    pub fn section(&self, ranges: &[Range]) -> Result<DimArray> {
        let data = self.data.section(ranges)?;
        let dimensions = self
            .dimensions
            .iter()
            .zip(ranges)
            .map(|(dim, range)| dim.section(range))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { data, dimensions })
    }

    /// Replace the data, keeping the dimensions.
    fn with_data(&self, data: Array) -> DimArray {
        Self {
            data,
            dimensions: self.dimensions.clone(),
        }
    }

    /// Element-wise sum; dimensions are taken from `self`.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ.
    pub fn add(&self, other: &DimArray) -> Result<DimArray> {
        Ok(self.with_data(self.data.add(&other.data)?))
    }

    /// Element-wise difference; dimensions are taken from `self`.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ.
    pub fn sub(&self, other: &DimArray) -> Result<DimArray> {
        Ok(self.with_data(self.data.sub(&other.data)?))
    }

    /// Element-wise product; dimensions are taken from `self`.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ.
    pub fn mul(&self, other: &DimArray) -> Result<DimArray> {
        Ok(self.with_data(self.data.mul(&other.data)?))
    }

    /// Element-wise quotient; dimensions are taken from `self`.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ, or
    /// [`GridError::DivideByZero`] for an integer division by zero.
    pub fn div(&self, other: &DimArray) -> Result<DimArray> {
        Ok(self.with_data(self.data.div(&other.data)?))
    }

    /// Multiply every element by a scalar.
    ///
    /// # Errors
    /// See [`Array::mul_scalar`].
    pub fn mul_scalar(&self, scalar: impl Into<Value>) -> Result<DimArray> {
        Ok(self.with_data(self.data.mul_scalar(scalar)?))
    }

    /// Divide every element by a scalar.
    ///
    /// # Errors
    /// See [`Array::div_scalar`].
    pub fn div_scalar(&self, scalar: impl Into<Value>) -> Result<DimArray> {
        Ok(self.with_data(self.data.div_scalar(scalar)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DimensionKind;

    fn grid() -> DimArray {
        let data = Array::from_vec(&[2, 3], (0..6).map(|v| v as f64).collect()).unwrap();
        let lat = Dimension::with_values(
            "lat",
            Array::from_vec(&[2], vec![10.0, 20.0]).unwrap(),
        )
        .unwrap()
        .with_kind(DimensionKind::Y);
        let lon = Dimension::new("lon", 3).staggered(true);
        DimArray::new(data, vec![lat, lon]).unwrap()
    }

    #[test]
    fn validates_dimensions() {
        let data = Array::zeros(crate::DataType::Float, &[2, 3]).unwrap();
        let err = DimArray::new(data.clone(), vec![Dimension::new("a", 3), Dimension::new("b", 2)]);
        assert!(matches!(err, Err(GridError::ShapeMismatch(_))));
        let err = DimArray::new(data.clone(), vec![Dimension::new("a", 2)]);
        assert!(matches!(err, Err(GridError::ShapeMismatch(_))));
        let err = DimArray::new(data, vec![Dimension::new("a", 2), Dimension::new("a", 3)]);
        assert!(matches!(err, Err(GridError::DuplicateDimension { .. })));
    }

    #[test]
    fn finds_dimensions() {
        let grid = grid();
        assert_eq!(grid.dimension_index_of("lon"), Some(1));
        assert_eq!(grid.dimension_index_of("time"), None);
        assert_eq!(grid.stagger_dim_index(), Some(1));
    }

    #[test]
    fn section_rebuilds_dimensions() {
        let grid = grid();
        let ranges = [Range::new(1, 1, 1).unwrap(), Range::new(0, 2, 2).unwrap()];
        let sub = grid.section(&ranges).unwrap();
        assert_eq!(sub.shape(), &[1, 2]);
        assert_eq!(sub.data().to_vec_f64().unwrap(), vec![3.0, 5.0]);
        assert_eq!(sub.dimension(0).unwrap().coordinate(0), Some(20.0));
        assert_eq!(sub.dimension(1).unwrap().length(), 2);
        assert!(sub.dimension(1).unwrap().is_staggered());
        assert!(sub.data().shares_storage_with(grid.data()));
    }

    #[test]
    fn arithmetic_keeps_dimensions() {
        let grid = grid();
        let doubled = grid.add(&grid).unwrap();
        assert_eq!(doubled.dimensions(), grid.dimensions());
        assert_eq!(doubled.data().get_f64(5).unwrap(), 10.0);
        let halved = doubled.div_scalar(2.0).unwrap();
        assert_eq!(halved.data(), grid.data());
    }
}
