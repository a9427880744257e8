//! Destaggering of grid-edge values to cell centers.
//!
//! Along a staggered axis of length `L`, output element `i` is the mean of
//! input elements `i` and `i + 1`, giving an axis of length `L - 1`. The
//! coordinate values of that axis are averaged the same way. Integer data is
//! averaged in `Double`; floating data keeps its precision.

use crate::array::{Array, DataType, Range};
use crate::dim_array::DimArray;
use crate::dimension::Dimension;
use crate::error::{GridError, Result};

/// Standard gravity in m s⁻², used to turn geopotential into height.
pub const GRAVITY: f64 = 9.81;

/// Length of `axis`, checked to be an axis of `array` with at least two elements.
fn stagger_length(array: &Array, axis: usize) -> Result<usize> {
    let rank = array.rank();
    if axis >= rank {
        return Err(GridError::AxisOutOfBounds { axis, rank });
    }
    let length = array.shape()[axis];
    if length < 2 {
        return Err(GridError::invalid_range(format!(
            "cannot destagger axis {} of length {}",
            axis, length
        )));
    }
    Ok(length)
}

/// The two overlapping sections of a non-empty `array` offset by one along `axis`.
fn adjacent_sections(array: &Array, axis: usize, length: usize) -> Result<(Array, Array)> {
    let mut ranges = array.full_ranges()?;
    ranges[axis] = Range::new(0, length as i64 - 2, 1)?;
    let lower = array.section(&ranges)?;
    ranges[axis] = Range::new(1, length as i64 - 1, 1)?;
    let upper = array.section(&ranges)?;
    Ok((lower, upper))
}

/// Average adjacent elements along `axis`.
///
/// # Errors
/// Returns [`GridError::AxisOutOfBounds`] if `axis` is not an axis of `array`,
/// or [`GridError::InvalidRange`] if the axis has fewer than two elements.
pub fn destagger_array(array: &Array, axis: usize) -> Result<Array> {
    let length = stagger_length(array, axis)?;
    if array.size() == 0 {
        // Another axis is empty, so there is nothing to average.
        let mut shape = array.shape().to_vec();
        shape[axis] = length - 1;
        let data_type = array.data_type().promote_scalar(DataType::Double);
        return Array::zeros(data_type, &shape);
    }
    let (lower, upper) = adjacent_sections(array, axis, length)?;
    lower.add(&upper)?.mul_scalar(0.5)
}

/// Destagger the first staggered dimension of `array`.
///
/// Returns the input unchanged when no dimension is staggered. When several
/// dimensions are staggered only the first is processed; use
/// [`destagger_axis`] to pick another.
///
/// # Errors
/// See [`destagger_axis`].
pub fn destagger(array: &DimArray) -> Result<DimArray> {
    match array.stagger_dim_index() {
        Some(axis) => destagger_axis(array, axis),
        None => {
            tracing::debug!("No staggered dimension, returning array unchanged");
            Ok(array.clone())
        }
    }
}

/// Destagger `array` along `axis`.
///
/// The new dimension keeps the name and kind of the old one, with averaged
/// coordinate values and the staggered flag cleared.
///
/// # Errors
/// Returns [`GridError::AxisOutOfBounds`] if `axis` is not an axis of `array`,
/// or [`GridError::InvalidRange`] if the axis has fewer than two elements.
pub fn destagger_axis(array: &DimArray, axis: usize) -> Result<DimArray> {
    let data = destagger_array(array.data(), axis)?;
    let mut dimensions = array.dimensions().to_vec();
    let old = &dimensions[axis];
    tracing::debug!(
        dimension = old.name(),
        length = old.length(),
        "Destaggering dimension"
    );
    let new = match old.coordinate_values() {
        Some(values) => old.with_coordinate_values(destagger_array(values, 0)?, false)?,
        None => Dimension::new(old.name(), old.length() - 1).with_kind(old.kind()),
    };
    dimensions[axis] = new;
    DimArray::new(data, dimensions)
}

/// Geopotential height from WRF perturbation and base-state geopotential.
///
/// Both inputs are destaggered along their first staggered dimension, summed
/// and divided by [`GRAVITY`].
///
/// # Errors
/// Returns any destaggering error, or [`GridError::ShapeMismatch`] if the
/// destaggered inputs differ in shape.
pub fn geopotential_height(ph: &DimArray, phb: &DimArray) -> Result<DimArray> {
    destagger(ph)?.add(&destagger(phb)?)?.div_scalar(GRAVITY)
}
